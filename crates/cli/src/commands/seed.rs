//! `flatshop seed` - load products and coupons from YAML.
//!
//! ```yaml
//! products:
//!   - image: https://example.com/mug.png
//!     name: Mug
//!     price: "12.50"
//!     quantity: 40
//! coupons:
//!   - code: TENOFF
//!     discount: 10
//!     discountType: percentage
//!     description: Ten percent off
//! ```
//!
//! Products always get fresh ids, so seeding the same file twice duplicates
//! them. Coupons whose code already exists are skipped.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use flatshop_server::services::{
    CatalogError, CatalogService, CouponError, CouponService, NewCoupon, NewProduct,
};
use flatshop_server::store::{Store, StoreError};

/// Errors from seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The seed file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The seed file is not valid YAML for a seed.
    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("product {index}: {source}")]
    Product { index: usize, source: CatalogError },

    #[error("coupon {code}: {source}")]
    Coupon { code: String, source: CouponError },
}

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub products: Vec<NewProduct>,
    pub coupons: Vec<NewCoupon>,
}

impl SeedFile {
    /// Parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Parse` for malformed YAML or unknown field types.
    pub fn parse(content: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products_added: usize,
    pub coupons_added: usize,
    pub coupons_skipped: usize,
}

/// Add everything in `seed` to `store`.
///
/// # Errors
///
/// Stops at the first product or coupon the services reject, other than a
/// duplicate coupon code.
pub async fn apply(store: &Store, seed: SeedFile) -> Result<SeedSummary, SeedError> {
    store.init().await?;
    let mut summary = SeedSummary::default();

    let catalog = CatalogService::new(store.products());
    for (index, product) in seed.products.into_iter().enumerate() {
        catalog
            .add_product(product)
            .await
            .map_err(|source| SeedError::Product { index, source })?;
        summary.products_added += 1;
    }

    let coupons = CouponService::new(store.coupons());
    for coupon in seed.coupons {
        let code = coupon.code.clone();
        match coupons.add_coupon(coupon).await {
            Ok(_) => summary.coupons_added += 1,
            Err(CouponError::AlreadyExists(_)) => {
                warn!(code = %code, "Coupon already exists, skipping");
                summary.coupons_skipped += 1;
            }
            Err(source) => return Err(SeedError::Coupon { code, source }),
        }
    }

    Ok(summary)
}

/// Read `file` and seed the store in `data_dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if seeding fails.
pub async fn run(data_dir: &Path, file: &Path) -> Result<SeedSummary, SeedError> {
    info!(path = %file.display(), "Loading seed file");

    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| SeedError::Read {
            path: file.to_path_buf(),
            source,
        })?;
    let seed = SeedFile::parse(&content)?;
    info!(
        products = seed.products.len(),
        coupons = seed.coupons.len(),
        "Parsed seed file"
    );

    let store = Store::open(data_dir);
    let summary = apply(&store, seed).await?;

    info!("Seeding complete!");
    info!("  Products added: {}", summary.products_added);
    info!("  Coupons added: {}", summary.coupons_added);
    info!("  Coupons skipped (already exist): {}", summary.coupons_skipped);

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r#"
products:
  - image: https://example.com/mug.png
    name: Mug
    price: "12.50"
    quantity: 40
  - image: https://example.com/cap.png
    name: Cap
    price: "20"
    quantity: 3
coupons:
  - code: TENOFF
    discount: "10"
    discountType: percentage
    description: Ten percent off
  - code: FIVE
    discount: "5"
    discount_type: amount
"#;

    #[test]
    fn test_parse_accepts_both_discount_type_spellings() {
        let seed = SeedFile::parse(SEED).unwrap();
        assert_eq!(seed.products.len(), 2);
        assert_eq!(seed.coupons.len(), 2);
        assert_eq!(seed.coupons[1].discount_type, "amount");
        assert!(seed.coupons[1].description.is_empty());
    }

    #[test]
    fn test_parse_missing_sections_default_to_empty() {
        let seed = SeedFile::parse("products: []\n").unwrap();
        assert!(seed.products.is_empty());
        assert!(seed.coupons.is_empty());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let result = SeedFile::parse("products:\n  - name: Mug\n    quantity: lots\n");
        assert!(matches!(result, Err(SeedError::Parse(_))));
    }

    #[tokio::test]
    async fn test_apply_assigns_sequential_ids() {
        let store = Store::in_memory();
        let summary = apply(&store, SeedFile::parse(SEED).unwrap()).await.unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                products_added: 2,
                coupons_added: 2,
                coupons_skipped: 0,
            }
        );
        let products = store.products().snapshot().await.unwrap();
        assert_eq!(products["1"].name, "Mug");
        assert_eq!(products["2"].name, "Cap");
    }

    #[tokio::test]
    async fn test_apply_twice_skips_existing_coupons() {
        let store = Store::in_memory();
        apply(&store, SeedFile::parse(SEED).unwrap()).await.unwrap();
        let summary = apply(&store, SeedFile::parse(SEED).unwrap()).await.unwrap();

        assert_eq!(summary.products_added, 2);
        assert_eq!(summary.coupons_added, 0);
        assert_eq!(summary.coupons_skipped, 2);
        assert_eq!(store.products().snapshot().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_apply_stops_on_invalid_coupon() {
        let seed = SeedFile::parse(
            "coupons:\n  - code: BAD\n    discount: \"5\"\n    discountType: bogus\n",
        )
        .unwrap();
        let result = apply(&Store::in_memory(), seed).await;
        assert!(matches!(result, Err(SeedError::Coupon { ref code, .. }) if code == "BAD"));
    }

    #[tokio::test]
    async fn test_run_reads_file_into_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("seed.yaml");
        std::fs::write(&file, SEED).unwrap();
        let data_dir = dir.path().join("data");

        let summary = run(&data_dir, &file).await.unwrap();
        assert_eq!(summary.products_added, 2);
        assert!(data_dir.join("coupons.json").exists());
    }

    #[tokio::test]
    async fn test_run_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(dir.path(), &dir.path().join("nope.yaml")).await;
        assert!(matches!(result, Err(SeedError::Read { .. })));
    }
}
