//! Guides — the reference content shown to every signed-in user.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored guide. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
  pub id:         Uuid,
  pub title:      String,
  pub content:    String,
  pub image_path: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

/// The three user-editable fields of a guide. Updates overwrite all three.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideDraft {
  pub title:      String,
  pub content:    String,
  pub image_path: String,
}

impl GuideDraft {
  pub fn new(
    title: impl Into<String>,
    content: impl Into<String>,
    image_path: impl Into<String>,
  ) -> Self {
    Self {
      title:      title.into(),
      content:    content.into(),
      image_path: image_path.into(),
    }
  }
}

/// Catalog order: ascending by title, compared byte-wise (so `"Zebra"` sorts
/// before `"apple"`). Equal titles have no defined relative order.
pub fn by_title(a: &Guide, b: &Guide) -> Ordering {
  a.title.as_bytes().cmp(b.title.as_bytes())
}

/// Sort `guides` into catalog order.
pub fn sort_catalog(guides: &mut [Guide]) { guides.sort_by(by_title); }

#[cfg(test)]
mod tests {
  use super::*;

  fn guide(title: &str) -> Guide {
    Guide {
      id:         Uuid::new_v4(),
      title:      title.into(),
      content:    String::new(),
      image_path: String::new(),
      created_at: Utc::now(),
      updated_at: None,
    }
  }

  #[test]
  fn catalog_order_is_case_sensitive() {
    let mut guides = vec![guide("burns"), guide("Zebra"), guide("Alpha")];
    sort_catalog(&mut guides);
    let titles: Vec<_> = guides.iter().map(|g| g.title.as_str()).collect();
    assert_eq!(titles, ["Alpha", "Zebra", "burns"]);
  }
}
