use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use flate2::read::GzDecoder;
use rxprice_core::PriceOrigin;

use super::*;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Unique scratch directory per test, removed on drop.
struct Scratch(PathBuf);

impl Scratch {
    fn new() -> Self {
        let n = NEXT_DIR.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "rxprice-export-{}-{n}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        Self(dir)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(8, 15, 30)
        .unwrap()
}

fn target(save_path: &Path) -> ExportTarget {
    ExportTarget {
        save_path: save_path.to_path_buf(),
        enterprise_code: 1042,
        serial_number: 77,
        stamp: stamp(),
    }
}

fn row(code: &str) -> NewPrice {
    NewPrice {
        code: code.to_string(),
        name: "Ibuprofen 200mg".to_string(),
        producer: "Farmak".to_string(),
        price: 80.0,
        reserve_price: 69.65,
        quantity: 3.0,
        origin: PriceOrigin::Market,
    }
}

fn snapshot(effective_at: Option<NaiveDateTime>) -> PriceSnapshot {
    PriceSnapshot {
        item_id: None,
        outer_code: "C-1".to_string(),
        name: "Aspirin".to_string(),
        producer: "Bayer".to_string(),
        base_price: 10.0,
        reserve_price: 9.0,
        quantity: 1.0,
        effective_at,
    }
}

#[test]
fn target_path_follows_layout() {
    let t = target(Path::new("/srv/out"));
    assert_eq!(
        t.path(),
        PathBuf::from("/srv/out/1042/rest_77_20240305081530.xml.gz")
    );
    assert_eq!(t.document_name(), "rest_77_20240305081530.xml");
}

#[test]
fn export_writes_decodable_archive() {
    let scratch = Scratch::new();
    let path = export_prices(&target(&scratch.0), &[row("C-1"), row("C-2")]).unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("gz.part").exists());

    let mut decoder = GzDecoder::new(File::open(&path).unwrap());
    let mut xml = String::new();
    decoder.read_to_string(&mut xml).unwrap();

    assert!(xml.contains("<Offers>"));
    assert_eq!(xml.matches("<Offer ").count(), 2);
    assert!(xml.contains(r#"PriceReserve="69.65""#));

    let header = decoder.header().unwrap();
    assert_eq!(header.filename(), Some(&b"rest_77_20240305081530.xml"[..]));
}

#[test]
fn empty_rows_are_rejected_without_touching_disk() {
    let scratch = Scratch::new();
    let err = export_prices(&target(&scratch.0), &[]).unwrap_err();
    assert!(matches!(err, ExportError::Empty));
    assert!(!scratch.0.exists());
}

#[test]
fn unwritable_save_path_is_io_error() {
    let scratch = Scratch::new();
    fs::create_dir_all(&scratch.0).unwrap();
    let blocker = scratch.0.join("not-a-dir");
    fs::write(&blocker, b"x").unwrap();

    let err = export_prices(&target(&blocker), &[row("C-1")]).unwrap_err();
    assert!(
        matches!(err, ExportError::Io { .. }),
        "expected Io, got: {err:?}"
    );
}

#[test]
fn run_stamp_is_earliest_snapshot_time() {
    let later = stamp() + chrono::Duration::hours(2);
    let rows = [snapshot(Some(later)), snapshot(None), snapshot(Some(stamp()))];
    assert_eq!(run_stamp(&rows), stamp());
}

#[test]
fn run_stamp_defaults_to_now() {
    let before = Utc::now().naive_utc();
    let got = run_stamp(&[snapshot(None)]);
    assert!(got >= before - chrono::Duration::seconds(1));
}
