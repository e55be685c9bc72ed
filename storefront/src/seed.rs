// storefront/src/seed.rs

//! Demo catalog inserted at startup when `SEED_DB=true`.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Item, ItemFilter};
use crate::store::Store;

struct SeedItem {
  title: &'static str,
  slug: &'static str,
  price_cents: i32,
  discount_price_cents: Option<i32>,
  description: &'static str,
}

const SHIRTS: &[SeedItem] = &[
  SeedItem {
    title: "Linen Shirt",
    slug: "linen-shirt",
    price_cents: 4500,
    discount_price_cents: Some(3900),
    description: "Loose-fit shirt in washed linen.",
  },
  SeedItem {
    title: "Oxford Shirt",
    slug: "oxford-shirt",
    price_cents: 5500,
    discount_price_cents: None,
    description: "Button-down collar, heavy oxford weave.",
  },
  SeedItem {
    title: "Flannel Overshirt",
    slug: "flannel-overshirt",
    price_cents: 6900,
    discount_price_cents: None,
    description: "Brushed cotton flannel with two chest pockets.",
  },
];

const OUTERWEAR: &[SeedItem] = &[
  SeedItem {
    title: "Rain Shell",
    slug: "rain-shell",
    price_cents: 12900,
    discount_price_cents: Some(9900),
    description: "Packable waterproof shell.",
  },
  SeedItem {
    title: "Wool Coat",
    slug: "wool-coat",
    price_cents: 24900,
    discount_price_cents: None,
    description: "Single-breasted coat in boiled wool.",
  },
];

const SPORTSWEAR: &[SeedItem] = &[
  SeedItem {
    title: "Running Tee",
    slug: "running-tee",
    price_cents: 2500,
    discount_price_cents: None,
    description: "Lightweight mesh tee.",
  },
  SeedItem {
    title: "Track Pants",
    slug: "track-pants",
    price_cents: 5900,
    discount_price_cents: Some(4900),
    description: "Tapered track pants with zip pockets.",
  },
];

/// Inserts the demo categories, items and the `WELCOME10` coupon. Does
/// nothing when the catalog already has items.
#[instrument(name = "seed::demo_catalog", skip(store), err(Display))]
pub async fn seed_demo_catalog(store: &dyn Store) -> Result<()> {
  if store.count_items(&ItemFilter::default()).await? > 0 {
    info!("Catalog already populated, skipping seed.");
    return Ok(());
  }

  let groups: [(&str, &str, &[SeedItem]); 3] = [
    ("Shirts", "shirts", SHIRTS),
    ("Outerwear", "outerwear", OUTERWEAR),
    ("Sportswear", "sportswear", SPORTSWEAR),
  ];

  let mut inserted = 0usize;
  for (title, slug, items) in groups {
    let category = store.insert_category(title, slug).await?;
    for seed in items {
      let item = Item {
        id: Uuid::new_v4(),
        title: seed.title.to_string(),
        price_cents: seed.price_cents,
        discount_price_cents: seed.discount_price_cents,
        category_id: category.id,
        slug: seed.slug.to_string(),
        description: seed.description.to_string(),
        image: format!("{}.jpg", seed.slug),
        created_at: Utc::now(),
      };
      store.insert_item(&item).await?;
      inserted += 1;
    }
  }
  store.insert_coupon("WELCOME10", 1000).await?;

  info!(items = inserted, "Demo catalog seeded.");
  Ok(())
}
