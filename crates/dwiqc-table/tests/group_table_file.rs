use std::fs;

use dwiqc_table::{append_record, Cell, GroupTableFile, MetricRecord, TableError};

fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

#[test]
fn two_subjects_with_different_optional_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("group_qc_dtifit.txt");

    let mut first = MetricRecord::for_subject("sub-01").unwrap();
    first.insert("Average_SNR(b<100)", 12.345678).unwrap();
    first.insert("Mean_FA_WM", 0.5123).unwrap();
    append_record(&path, &first).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(tokens(lines[0]), ["Sub", "Average_SNR(b<100)", "Mean_FA_WM"]);
    assert_eq!(tokens(lines[1]), ["sub-01", "12.3457", "0.5123"]);

    let mut second = MetricRecord::for_subject("sub-02").unwrap();
    second.insert("Average_SNR(b<100)", 9.0).unwrap();
    second.insert("Mean_MD_WM", 0.0008).unwrap();
    append_record(&path, &second).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(tokens(lines[0]), ["Sub", "Average_SNR(b<100)", "Mean_FA_WM", "Mean_MD_WM"]);
    assert_eq!(tokens(lines[1]), ["sub-01", "12.3457", "0.5123", "NaN"]);
    assert_eq!(tokens(lines[2]), ["sub-02", "9", "NaN", "0.0008"]);
}

#[test]
fn history_is_preserved_across_many_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("group_qc.txt");

    for i in 0..12 {
        let mut r = MetricRecord::for_subject(&format!("sub-{i:02}")).unwrap();
        r.insert("Total_Outliers", i as f64 * 0.25).unwrap();
        if i % 3 == 0 {
            r.insert("Mean_Eddy_Residuals", 100.0 + i as f64).unwrap();
        }
        append_record(&path, &r).unwrap();
    }

    let table = GroupTableFile::new(&path).load().unwrap();
    assert_eq!(table.len(), 12);
    assert_eq!(table.columns(), ["Sub", "Total_Outliers", "Mean_Eddy_Residuals"]);
    for i in 0..12 {
        let row = table.row(i).unwrap();
        assert_eq!(row.subject(), Some(format!("sub-{i:02}").as_str()));
        assert_eq!(row.get("Total_Outliers"), Some(&Cell::Number(i as f64 * 0.25)));
        let expected = if i % 3 == 0 { Cell::Number(100.0 + i as f64) } else { Cell::Null };
        assert_eq!(table.cell(i, "Mean_Eddy_Residuals"), Some(&expected));
    }
}

#[test]
fn reading_a_legacy_indexed_table_then_appending_drops_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("group_qc.txt");
    fs::write(
        &path,
        "      Sub  Total_Outliers\n0  sub-01        0.829876\n1  sub-02        1.203400\n",
    )
    .unwrap();

    let mut r = MetricRecord::for_subject("sub-03").unwrap();
    r.insert("Total_Outliers", 0.5).unwrap();
    append_record(&path, &r).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(tokens(lines[0]), ["Sub", "Total_Outliers"]);
    // values written by other tools are kept verbatim
    assert_eq!(tokens(lines[1]), ["sub-01", "0.829876"]);
    assert_eq!(tokens(lines[2]), ["sub-02", "1.203400"]);
    assert_eq!(tokens(lines[3]), ["sub-03", "0.5"]);
}

#[test]
fn garbage_file_is_reported_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("group_qc.txt");
    fs::write(&path, "Sub X\nthis line is much longer than the header\n").unwrap();

    let r = MetricRecord::for_subject("sub-01").unwrap();
    let err = append_record(&path, &r).unwrap_err();
    assert!(matches!(err, TableError::Corrupt { .. }), "{err}");
}
