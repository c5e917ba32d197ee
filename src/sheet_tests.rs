#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;
use std::fs;

use super::*;

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn make_sale(job_id: i64) -> Sale {
    Sale {
        job_id,
        date: NaiveDate::from_ymd_opt(2024, 2, 14).unwrap(),
        channel: "ETSY".into(),
        ad: true,
        rent: false,
        amount: dec!(40),
        shipping: dec!(5.5),
        total_amount: dec!(45.5),
        paid_by: dec!(0),
        operator_income: dec!(20),
        item_text: "2 mug, 1 tote bag".into(),
        items_text: "['mug', 'tote bag']".into(),
    }
}

// ── Reading ───────────────────────────────────────────────────

#[test]
fn test_read_legacy_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "shop.csv",
        "Job #,date,Channel,Ad,rent,Amount,Shipping,Total Amount,Paid by F,Farahy Income,Item,items\n\
         12.0,2024-01-05 00:00:00,ETSY,Y,N,\"$1,200.00\",10,1210,0,300,\"3 widget, 1 gadget\",\"['widget', 'gadget']\"\n",
    );
    let sales = SheetFile::new(&path).read().unwrap();

    assert_eq!(sales.len(), 1);
    let sale = &sales[0];
    assert_eq!(sale.job_id, 12);
    assert_eq!(sale.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    assert!(sale.ad);
    assert!(!sale.rent);
    assert_eq!(sale.amount, dec!(1200));
    assert_eq!(sale.paid_by, dec!(0));
    assert_eq!(sale.operator_income, dec!(300));
    assert_eq!(sale.item_text, "3 widget, 1 gadget");
    assert_eq!(sale.basket(), vec!["widget", "gadget"]);
}

#[test]
fn test_read_missing_optional_columns_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "min.csv", "date,Job #\n03/15/2024,4\n");
    let sales = SheetFile::new(&path).read().unwrap();
    assert_eq!(sales[0].job_id, 4);
    assert_eq!(sales[0].channel, "");
    assert_eq!(sales[0].total_amount, Decimal::ZERO);
    assert!(sales[0].basket().is_empty());
}

#[test]
fn test_read_skips_blank_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "blank.csv",
        "Job #,date,Channel\n1,2024-01-01,ETSY\n,,\n2,2024-01-02,SHOP\n",
    );
    let sales = SheetFile::new(&path).read().unwrap();
    assert_eq!(sales.len(), 2);
}

#[test]
fn test_read_missing_required_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bad.csv", "Channel,Amount\nETSY,5\n");
    let err = SheetFile::new(&path).read().unwrap_err();
    assert!(err.to_string().contains("Job #"));
}

#[test]
fn test_read_bad_date_reports_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bad.csv", "Job #,date\n1,2024-01-01\n2,someday\n");
    let err = SheetFile::new(&path).read().unwrap_err();
    assert!(format!("{err:#}").contains("Row 3"));
}

#[test]
fn test_read_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let sheet = SheetFile::new(&dir.path().join("nope.csv"));
    assert!(sheet.read().unwrap().is_empty());
}

// ── Writing ───────────────────────────────────────────────────

#[test]
fn test_write_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let mut sheet = SheetFile::new(&path);
    let sales = vec![make_sale(1), make_sale(2)];

    sheet.replace_all(&sales).unwrap();
    assert_eq!(sheet.load().unwrap(), sales);
}

#[test]
fn test_write_uses_canonical_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    SheetFile::new(&path).write(&[make_sale(1)]).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "Job #,date,Channel,Ad,rent,Amount,Shipping,Total Amount,Paid By,Operator Income,Item,items"
    );
    assert!(text.contains(",Y,N,"));
}

#[test]
fn test_write_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    SheetFile::new(&path).write(&[make_sale(1)]).unwrap();
    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["out.csv"]);
}

// ── Value parsing ─────────────────────────────────────────────

#[test]
fn test_parse_job_id() {
    assert_eq!(parse_job_id("12").unwrap(), 12);
    assert_eq!(parse_job_id(" 12.0 ").unwrap(), 12);
    assert!(parse_job_id("12.5").is_err());
    assert!(parse_job_id("abc").is_err());
}

#[test]
fn test_parse_date_formats() {
    let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    assert_eq!(parse_date("2024-03-15").unwrap(), expected);
    assert_eq!(parse_date("03/15/2024").unwrap(), expected);
    assert_eq!(parse_date("2024-03-15 00:00:00").unwrap(), expected);
    assert_eq!(parse_date("2024-03-15T10:30:00").unwrap(), expected);
    assert!(parse_date("March").is_err());
}

#[test]
fn test_parse_decimal() {
    assert_eq!(parse_decimal("$1,234.50").unwrap(), dec!(1234.50));
    assert_eq!(parse_decimal("(15.00)").unwrap(), dec!(-15));
    assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
    assert!(parse_decimal("n/a").is_err());
}
