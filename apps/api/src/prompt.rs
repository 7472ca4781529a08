//! # ワークアウト解析用のシステム指示
//!
//! Completion API に渡す固定の指示文。出力 JSON の形状はここでのみ定義され、
//! ハンドラ側では検証しない（JSON として解釈できるかだけを確認する）。
//!
//! ## 出力スキーマ
//!
//! ```json
//! {
//!   "title": "descriptive workout title",
//!   "exercises": [
//!     { "name": "exercise name", "sets": [ { "set_number": 1, "reps": 10, "weight": 135 } ] }
//!   ]
//! }
//! ```

/// システム指示文
pub const WORKOUT_SYSTEM_PROMPT: &str = r#"You are a workout parser. Parse the user's raw workout text into structured JSON.
Always return valid JSON matching this exact schema:
{
  "title": "descriptive workout title",
  "exercises": [
    {
      "name": "exercise name",
      "sets": [
        { "set_number": 1, "reps": 10, "weight": 135 }
      ]
    }
  ]
}
If weight is not mentioned, default to 0. If reps are not mentioned, default to 0.
Return ONLY the JSON object, no markdown, no explanation."#;

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_指示文にスキーマの全フィールドが含まれる() {
      for field in ["\"title\"", "\"exercises\"", "\"name\"", "\"sets\"", "\"set_number\"", "\"reps\"", "\"weight\""] {
         assert!(
            WORKOUT_SYSTEM_PROMPT.contains(field),
            "指示文に {field} が含まれること"
         );
      }
   }

   #[test]
   fn test_指示文はjsonのみを返すよう求める() {
      assert!(WORKOUT_SYSTEM_PROMPT.contains("Return ONLY the JSON object"));
   }
}
