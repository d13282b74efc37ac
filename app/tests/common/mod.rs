//! FILENAME: app/tests/common/mod.rs
//! Test harness and fixtures for dashboard backend integration tests.

#![allow(dead_code)]

use app_lib::{create_dashboard_state, DashboardConfig, DashboardState};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test harness owning a scratch workspace and fresh state.
pub struct TestHarness {
    pub state: DashboardState,
    pub dir: TempDir,
}

impl TestHarness {
    /// Empty source and period folders.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for folder in ["sources", "cache", "periods"] {
            fs::create_dir_all(dir.path().join(folder)).unwrap();
        }
        let config = DashboardConfig {
            source_folder: dir.path().join("sources"),
            cache_folder: dir.path().join("cache"),
            period_base_folder: dir.path().join("periods"),
            period_extension: "csv".to_string(),
            metrics: vec!["Item revenue".to_string(), "Sessions".to_string()],
            ..DashboardConfig::default()
        };
        TestHarness {
            state: create_dashboard_state(config),
            dir,
        }
    }

    /// Two monthly sales exports plus invoice files for June 2025, May 2025
    /// and June 2024.
    pub fn with_sample_data() -> Self {
        let harness = Self::new();
        harness.write_source("may_sales.csv", SalesFixture::MAY);
        harness.write_source("june_sales.csv", SalesFixture::JUNE);
        harness.write_period("June-2025", "june invoice.csv", InvoiceFixture::JUNE_2025);
        harness.write_period("May-2025", "May Invoice.csv", InvoiceFixture::MAY_2025);
        harness.write_period("June-2024", "invoice june 24.csv", InvoiceFixture::JUNE_2024);
        harness
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write_source(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path("sources").join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn write_period(&self, folder: &str, name: &str, contents: &str) -> PathBuf {
        let dir = self.path("periods").join(folder);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn exists(&self, relative: &str) -> bool {
        Path::new(&self.path(relative)).exists()
    }
}

/// Monthly sales exports for the month comparison dashboard.
pub struct SalesFixture;

impl SalesFixture {
    pub const MAY: &'static str = "\
Date,Category,Brand,Item name,Item revenue,Sessions
2025-05-01,Shoes,Acme,Runner,100,10
2025-05-02,Bags,Zenith,Tote,200,20
2025-05-09,Shoes,Acme,Walker,50,5
2025-05-03,JSP,Acme,Promo,999,1
";

    pub const JUNE: &'static str = "\
Date,Category,Brand,Item name,Item revenue,Sessions
2025-06-01,Shoes,Acme,Runner,150,12
2025-06-10,Bags,Zenith,Tote,100,8
2025-06-10,Hats,Acme,Cap,40,4
";
}

/// Invoice files for the product dashboard.
pub struct InvoiceFixture;

impl InvoiceFixture {
    pub const JUNE_2025: &'static str = concat!(
        "idg,InvoiceDate,TYPE,Brand,ProductDesc,ItemName,Category Name (L3),Amount Invoiced W.O. VAT,QtyOrdered\n",
        "Retail,01/06/2025,Store,Acme,Runner,Runner,Shoes,300,3\n",
        "Retail,02/06/2025,CC,Zenith,Tote,Tote,Bags,200,2\n",
        "FOC,02/06/2025,Store,Acme,Freebie,Freebie,Shoes,500,5\n",
        "Retail,15/06/2025,Store,Acme,Cap,Cap,Hats,100,4\n",
    );

    pub const MAY_2025: &'static str = concat!(
        "idg,InvoiceDate,TYPE,Brand,ProductDesc,ItemName,Category Name (L3),Amount Invoiced W.O. VAT,QtyOrdered\n",
        "Retail,05/05/2025,Store,Acme,Runner,Runner,Shoes,200,2\n",
        "Retail,06/05/2025,Store,Zenith,Tote,Tote,Bags,100,1\n",
    );

    pub const JUNE_2024: &'static str = concat!(
        "idg,InvoiceDate,TYPE,Brand,ProductDesc,ItemName,Category Name (L3),Amount Invoiced W.O. VAT,QtyOrdered\n",
        "Retail,03/06/2024,Store,Acme,Runner,Runner,Shoes,150,1\n",
    );
}
