use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Star rating for a review, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const BEST: Rating = Rating(Self::MAX);

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::RatingOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Parse a rating sent by a client, either as a JSON integer or as a
    /// string holding one (HTML forms submit strings).
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or(ValidationError::RatingNotInteger)
                .and_then(Self::new),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Err(ValidationError::MissingField("rating"));
                }
                s.parse::<i64>()
                    .map_err(|_| ValidationError::RatingNotInteger)
                    .and_then(Self::new)
            }
            Value::Null => Err(ValidationError::MissingField("rating")),
            _ => Err(ValidationError::RatingNotInteger),
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        i64::from(rating.0)
    }
}

/// A stored book review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub rating: Rating,
    pub review_text: String,
}

impl Review {
    pub fn from_draft(id: i64, draft: ReviewDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            rating: draft.rating,
            review_text: draft.review_text,
        }
    }

    /// Overwrite every field except the id
    pub fn overwrite(&mut self, draft: ReviewDraft) {
        self.title = draft.title;
        self.author = draft.author;
        self.rating = draft.rating;
        self.review_text = draft.review_text;
    }
}

/// Validated review fields, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub title: String,
    pub author: String,
    pub rating: Rating,
    pub review_text: String,
}

impl ReviewDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        rating: Rating,
        review_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            rating,
            review_text: review_text.into(),
        }
    }
}

/// Request body for create and update, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewInput {
    pub title: Option<Value>,
    pub author: Option<Value>,
    pub rating: Option<Value>,
    pub review_text: Option<Value>,
}

impl ReviewInput {
    /// Check every field constraint, reporting the first one that fails
    pub fn validate(self) -> Result<ReviewDraft, ValidationError> {
        let title = required_text("title", self.title)?;
        let author = required_text("author", self.author)?;
        let rating = match self.rating {
            Some(value) => Rating::from_json(&value)?,
            None => return Err(ValidationError::MissingField("rating")),
        };
        let review_text = required_text("review_text", self.review_text)?;

        Ok(ReviewDraft {
            title,
            author,
            rating,
            review_text,
        })
    }
}

fn required_text(field: &'static str, value: Option<Value>) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(v)) if !v.trim().is_empty() => Ok(v),
        None | Some(Value::Null) | Some(Value::String(_)) => {
            Err(ValidationError::MissingField(field))
        }
        Some(_) => Err(ValidationError::NotText(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> ReviewInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Rating::new(1).unwrap().get(), 1);
        assert_eq!(Rating::new(5).unwrap().get(), 5);
        assert_eq!(Rating::new(0), Err(ValidationError::RatingOutOfRange(0)));
        assert_eq!(Rating::new(6), Err(ValidationError::RatingOutOfRange(6)));
        assert_eq!(Rating::new(-3), Err(ValidationError::RatingOutOfRange(-3)));
    }

    #[test]
    fn test_rating_from_json() {
        assert_eq!(Rating::from_json(&json!(4)).unwrap().get(), 4);
        assert_eq!(Rating::from_json(&json!(" 3 ")).unwrap().get(), 3);
        assert_eq!(
            Rating::from_json(&json!(4.5)),
            Err(ValidationError::RatingNotInteger)
        );
        assert_eq!(
            Rating::from_json(&json!("five")),
            Err(ValidationError::RatingNotInteger)
        );
        assert_eq!(
            Rating::from_json(&json!(true)),
            Err(ValidationError::RatingNotInteger)
        );
        assert_eq!(
            Rating::from_json(&json!("")),
            Err(ValidationError::MissingField("rating"))
        );
        assert_eq!(
            Rating::from_json(&json!("9")),
            Err(ValidationError::RatingOutOfRange(9))
        );
    }

    #[test]
    fn test_rating_serde() {
        assert_eq!(serde_json::to_value(Rating::new(2).unwrap()).unwrap(), json!(2));
        assert!(serde_json::from_value::<Rating>(json!(7)).is_err());
    }

    #[test]
    fn test_validate_accepts_complete_input() {
        let draft = input(json!({
            "title": "Dune",
            "author": "Herbert",
            "rating": 5,
            "review_text": "Epic"
        }))
        .validate()
        .unwrap();

        assert_eq!(draft.title, "Dune");
        assert_eq!(draft.author, "Herbert");
        assert_eq!(draft.rating.get(), 5);
        assert_eq!(draft.review_text, "Epic");
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let err = input(json!({ "rating": 5 })).validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("title"));

        let err = input(json!({ "title": "Dune", "author": "  ", "rating": 5 }))
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("author"));

        let err = input(json!({ "title": "Dune", "author": "Herbert", "review_text": "Epic" }))
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("rating"));

        let err = input(json!({ "title": "Dune", "author": "Herbert", "rating": 3, "review_text": "" }))
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("review_text"));
    }

    #[test]
    fn test_validate_rejects_non_string_text() {
        let err = input(json!({
            "title": 123,
            "author": "Herbert",
            "rating": 5,
            "review_text": "Epic"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::NotText("title"));

        let err = input(json!({
            "title": "Dune",
            "author": null,
            "rating": 5,
            "review_text": "Epic"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("author"));

        let err = input(json!({
            "title": "Dune",
            "author": "Herbert",
            "rating": 5,
            "review_text": ["x"]
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::NotText("review_text"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_rating() {
        let err = input(json!({
            "title": "Dune",
            "author": "Herbert",
            "rating": 6,
            "review_text": "Epic"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::RatingOutOfRange(6));
    }

    #[test]
    fn test_overwrite_keeps_id() {
        let mut review = Review::from_draft(
            7,
            ReviewDraft::new("Dune", "Herbert", Rating::new(5).unwrap(), "Epic"),
        );
        review.overwrite(ReviewDraft::new(
            "Dune Messiah",
            "Herbert",
            Rating::new(4).unwrap(),
            "Sequel",
        ));

        assert_eq!(review.id, 7);
        assert_eq!(review.title, "Dune Messiah");
        assert_eq!(review.rating.get(), 4);
    }
}
