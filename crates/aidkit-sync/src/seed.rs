//! First-run bootstrap of the default guide catalog.

use std::sync::Arc;

use aidkit_core::{Result, store::GuideStore};
use tokio::sync::Mutex;

use crate::content::ContentStore;

/// A built-in guide inserted on first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedGuide {
  pub title:      &'static str,
  pub content:    &'static str,
  pub image_path: &'static str,
}

/// The catalog a fresh store starts with, in insertion order.
pub const DEFAULT_GUIDES: [SeedGuide; 9] = [
  SeedGuide {
    title:      "Burns",
    content:    "1. Move away from the source of the burn.\n\
                 2. Cool the burn under cool running water for at least 20 minutes.\n\
                 3. Remove jewellery and clothing near the burn unless stuck to the skin.\n\
                 4. Cover loosely with cling film or a clean non-fluffy dressing.\n\
                 5. Do not apply ice, butter or creams.\n\
                 6. Seek medical help for large, deep or facial burns.",
    image_path: "assets/images/burns.png",
  },
  SeedGuide {
    title:      "Fractures",
    content:    "1. Keep the casualty still and support the injured limb.\n\
                 2. Do not try to straighten the bone.\n\
                 3. Immobilise the joint above and below the injury with padding or a splint.\n\
                 4. Control any bleeding with a clean dressing.\n\
                 5. Apply a cold pack wrapped in cloth to reduce swelling.\n\
                 6. Call emergency services for open fractures or suspected spinal injury.",
    image_path: "assets/images/fractures.png",
  },
  SeedGuide {
    title:      "Choking",
    content:    "1. Encourage the casualty to keep coughing.\n\
                 2. If coughing fails, give up to 5 firm back blows between the shoulder blades.\n\
                 3. If still choking, give up to 5 abdominal thrusts.\n\
                 4. Alternate back blows and abdominal thrusts.\n\
                 5. Call emergency services if the obstruction does not clear.\n\
                 6. Start CPR if the casualty becomes unresponsive.",
    image_path: "assets/images/choking.png",
  },
  SeedGuide {
    title:      "CPR",
    content:    "1. Check the scene is safe and the casualty is unresponsive.\n\
                 2. Call emergency services and ask for a defibrillator.\n\
                 3. Place the heel of your hand in the centre of the chest.\n\
                 4. Push hard and fast: 5-6 cm deep, 100-120 compressions a minute.\n\
                 5. If trained, give 2 rescue breaths after every 30 compressions.\n\
                 6. Continue until help arrives or the casualty starts breathing.",
    image_path: "assets/images/cpr.png",
  },
  SeedGuide {
    title:      "Cuts & Bleeding",
    content:    "1. Wear gloves if available.\n\
                 2. Apply firm, direct pressure on the wound with a clean pad.\n\
                 3. Raise the injured part above the level of the heart.\n\
                 4. Secure the pad with a bandage; add more pads if blood soaks through.\n\
                 5. Do not remove embedded objects; pad around them.\n\
                 6. Call emergency services for severe bleeding.",
    image_path: "assets/images/bleeding.png",
  },
  SeedGuide {
    title:      "Fainting",
    content:    "1. Help the casualty lie down on their back.\n\
                 2. Raise their legs about 30 cm to restore blood flow to the brain.\n\
                 3. Loosen tight clothing and ensure fresh air.\n\
                 4. Reassure them as they recover and keep them lying down for a few minutes.\n\
                 5. If they do not come round quickly, check breathing and call emergency services.",
    image_path: "assets/images/fainting.png",
  },
  SeedGuide {
    title:      "Bites & Stings",
    content:    "1. Move away from the animal or insect.\n\
                 2. Scrape out any visible sting with a fingernail or card.\n\
                 3. Wash the area with soap and water.\n\
                 4. Apply a cold compress to reduce swelling.\n\
                 5. Watch for signs of allergic reaction: swelling of the face, difficulty breathing.\n\
                 6. Call emergency services for anaphylaxis and use an auto-injector if available.",
    image_path: "assets/images/bites.png",
  },
  SeedGuide {
    title:      "Hypothermia",
    content:    "1. Move the casualty to a warm, sheltered place.\n\
                 2. Replace wet clothing with dry layers and cover the head.\n\
                 3. Wrap them in blankets or a foil blanket.\n\
                 4. Give warm, non-alcoholic drinks if they are fully alert.\n\
                 5. Do not rub the limbs or apply direct heat.\n\
                 6. Call emergency services if symptoms are severe.",
    image_path: "assets/images/hypothermia.png",
  },
  SeedGuide {
    title:      "Poisoning",
    content:    "1. Find out what was taken, how much and when.\n\
                 2. Do not induce vomiting.\n\
                 3. Call emergency services or a poison control centre.\n\
                 4. Keep any containers or packaging to show the responders.\n\
                 5. If the casualty becomes unresponsive, check breathing and start CPR if needed.",
    image_path: "assets/images/poisoning.png",
  },
];

/// Inserts [`DEFAULT_GUIDES`] into an empty catalog.
///
/// Calls within one process are serialized, so they never both see an
/// empty catalog. Separate processes sharing a store still can, and would
/// then each insert the full set.
pub struct SeedLoader<G> {
  content: Arc<ContentStore<G>>,
  startup: Mutex<()>,
}

impl<G: GuideStore> SeedLoader<G> {
  pub fn new(content: Arc<ContentStore<G>>) -> Self {
    Self {
      content,
      startup: Mutex::new(()),
    }
  }

  /// Seed the catalog if and only if it is empty. Returns how many guides
  /// were inserted. A failed insert stops seeding; the entries already
  /// written stay.
  pub async fn ensure_default_content(&self) -> Result<usize> {
    let _startup = self.startup.lock().await;

    let existing = self.content.list_guides().await?;
    if !existing.is_empty() {
      tracing::debug!(guides = existing.len(), "catalog already populated");
      return Ok(0);
    }

    for seed in &DEFAULT_GUIDES {
      self
        .content
        .create_guide(seed.title, seed.content, seed.image_path)
        .await?;
    }

    tracing::info!(count = DEFAULT_GUIDES.len(), "seeded default guides");
    Ok(DEFAULT_GUIDES.len())
  }
}

#[cfg(test)]
mod tests {
  use aidkit_store_sqlite::SqliteStore;

  use super::*;
  use crate::{config::SyncConfig, testing::FlakyGuides};

  async fn loader() -> (SeedLoader<SqliteStore>, Arc<ContentStore<SqliteStore>>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let content = Arc::new(ContentStore::new(store, &SyncConfig::default()));
    (SeedLoader::new(content.clone()), content)
  }

  #[test]
  fn default_catalog_has_numbered_steps() {
    for seed in &DEFAULT_GUIDES {
      assert!(seed.content.starts_with("1. "), "{}", seed.title);
      assert!(seed.image_path.starts_with("assets/images/"));
    }
  }

  #[tokio::test]
  async fn seeds_empty_catalog() {
    let (seeder, content) = loader().await;
    assert_eq!(seeder.ensure_default_content().await.unwrap(), 9);

    let titles: Vec<String> = content
      .list_guides()
      .await
      .unwrap()
      .iter()
      .map(|g| g.title.clone())
      .collect();
    assert_eq!(titles, [
      "Bites & Stings",
      "Burns",
      "CPR",
      "Choking",
      "Cuts & Bleeding",
      "Fainting",
      "Fractures",
      "Hypothermia",
      "Poisoning",
    ]);
  }

  #[tokio::test]
  async fn seeding_twice_is_idempotent() {
    let (seeder, content) = loader().await;
    seeder.ensure_default_content().await.unwrap();
    assert_eq!(seeder.ensure_default_content().await.unwrap(), 0);
    assert_eq!(content.list_guides().await.unwrap().len(), 9);
  }

  #[tokio::test]
  async fn concurrent_calls_in_one_process_seed_once() {
    let (seeder, content) = loader().await;
    let (a, b) = tokio::join!(
      seeder.ensure_default_content(),
      seeder.ensure_default_content()
    );
    assert_eq!(a.unwrap() + b.unwrap(), 9);
    assert_eq!(content.list_guides().await.unwrap().len(), 9);
  }

  #[tokio::test]
  async fn non_empty_catalog_is_left_alone() {
    let (seeder, content) = loader().await;
    content.create_guide("Sunburn", "1. Get out of the sun.", "").await.unwrap();

    assert_eq!(seeder.ensure_default_content().await.unwrap(), 0);
    assert_eq!(content.list_guides().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn failed_insert_stops_seeding_and_keeps_earlier_entries() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let guides = Arc::new(FlakyGuides::new(store.clone()).failing_insert(3));
    let seeder = SeedLoader::new(Arc::new(ContentStore::new(guides, &SyncConfig::default())));

    let err = seeder.ensure_default_content().await.unwrap_err();
    assert!(matches!(err, aidkit_core::Error::NetworkFailure(_)));

    let mut titles: Vec<String> = store
      .list_guides()
      .await
      .unwrap()
      .into_iter()
      .map(|g| g.title)
      .collect();
    titles.sort();
    assert_eq!(titles, ["Burns", "Choking", "Fractures"]);
  }

  #[tokio::test]
  async fn each_seed_gets_its_own_id() {
    let (seeder, content) = loader().await;
    seeder.ensure_default_content().await.unwrap();

    let mut ids: Vec<_> = content.list_guides().await.unwrap().iter().map(|g| g.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 9);
  }
}
