use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::Path;
use traitmatrix::{BuildOptions, ColumnSpec, PresenceMatrix, RowOrder};

fn write_file<P: AsRef<Path>>(path: P, content: &str) -> anyhow::Result<()> {
    let mut f = fs::File::create(path)?;
    f.write_all(content.as_bytes())?;
    Ok(())
}

fn annotation_table() -> String {
    [
        "q1\tGCA_000001\t.\t.\t.\t.\t.\t.\tK00001",
        "q2\tGCA_000002\t.\t.\t.\t.\t.\t.\tK00002",
        "q3\tGCA_000001\t.\t.\t.\t.\t.\t.\tK00003",
        "q4\tGCA_000003\t.\t.\tK00001",
        "q5\tGCA_000002\t.\t.\t.\t.\t.\t.\tK00002",
        "q6\tGCA_000004\t.\t.\t.\t.\t.\t.\tK99999",
    ]
    .join("\n")
        + "\n"
}

#[test]
fn test_end_to_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let values = dir.path().join("values.txt");
    let input = dir.path().join("annotations.tsv");
    let output = dir.path().join("out").join("matrix.csv");

    write_file(&values, "K00001\nK00002\n\nK00003\n")?;
    write_file(&input, &annotation_table())?;

    let pm = PresenceMatrix::from_paths(&values, &input, &BuildOptions::default())?;
    assert_eq!(pm.n_discarded(), 1);
    pm.write_csv(&output)?;

    let csv = fs::read_to_string(&output)?;
    assert_eq!(
        csv,
        ",K00001,K00002,K00003\n\
         GCA_000001,1,0,1\n\
         GCA_000002,0,1,0\n\
         GCA_000004,0,0,0\n"
    );

    // every row has one cell per vocabulary entry, each 0 or 1
    for line in csv.lines().skip(1) {
        let cells: Vec<&str> = line.split(',').skip(1).collect();
        assert_eq!(cells.len(), 3);
        assert!(cells.iter().all(|c| *c == "0" || *c == "1"));
    }
    Ok(())
}

#[test]
fn test_output_is_reproducible() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let values = dir.path().join("values.txt");
    let input = dir.path().join("annotations.tsv");
    write_file(&values, "K00003\nK00001\nK00002\n")?;
    write_file(&input, &annotation_table())?;

    let opts = BuildOptions::new(ColumnSpec::default(), RowOrder::Lexical);
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    PresenceMatrix::from_paths(&values, &input, &opts)?.write_csv(&first)?;
    PresenceMatrix::from_paths(&values, &input, &opts)?.write_csv(&second)?;

    assert_eq!(fs::read(&first)?, fs::read(&second)?);
    Ok(())
}

#[test]
fn test_overwrites_existing_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let values = dir.path().join("values.txt");
    let input = dir.path().join("annotations.tsv");
    let output = dir.path().join("matrix.csv");
    write_file(&values, "K00001\n")?;
    write_file(&input, &annotation_table())?;
    write_file(&output, "stale content that is much longer than the new matrix\n".repeat(10).as_str())?;

    PresenceMatrix::from_paths(&values, &input, &BuildOptions::default())?.write_csv(&output)?;
    assert_eq!(
        fs::read_to_string(&output)?,
        ",K00001\nGCA_000001,1\nGCA_000002,0\nGCA_000004,0\n"
    );
    Ok(())
}

#[test]
fn test_gzipped_input_matches_plain_input() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let values = dir.path().join("values.txt");
    let plain = dir.path().join("annotations.tsv");
    let gzipped = dir.path().join("annotations.tsv.gz");
    write_file(&values, "K00001\nK00002\nK00003\n")?;
    write_file(&plain, &annotation_table())?;

    let mut enc = GzEncoder::new(fs::File::create(&gzipped)?, Compression::default());
    enc.write_all(annotation_table().as_bytes())?;
    enc.finish()?;

    let mut from_plain = Vec::new();
    PresenceMatrix::from_paths(&values, &plain, &BuildOptions::default())?
        .write_csv_to(&mut from_plain)?;
    let mut from_gz = Vec::new();
    PresenceMatrix::from_paths(&values, &gzipped, &BuildOptions::default())?
        .write_csv_to(&mut from_gz)?;

    assert_eq!(from_plain, from_gz);
    Ok(())
}

#[test]
fn test_missing_input_writes_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let values = dir.path().join("values.txt");
    let input = dir.path().join("missing.tsv");
    let output = dir.path().join("matrix.csv");
    write_file(&values, "K00001\n")?;

    let res = PresenceMatrix::from_paths(&values, &input, &BuildOptions::default())
        .and_then(|pm| pm.write_csv(&output));
    let err = res.expect_err("reading a missing observation table should fail");
    assert!(format!("{:#}", err).contains("Could not read the observation table"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_missing_vocabulary_is_an_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("annotations.tsv");
    write_file(&input, &annotation_table())?;

    let res = PresenceMatrix::from_paths(
        dir.path().join("missing.txt"),
        &input,
        &BuildOptions::default(),
    );
    assert!(res.is_err());
    Ok(())
}

#[test]
fn test_custom_columns() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let values = dir.path().join("values.txt");
    let input = dir.path().join("pairs.tsv");
    write_file(&values, "red\nblue\n")?;
    write_file(&input, "red\tsample_b\nblue\tsample_a\nred\tsample_a\nlonely\n")?;

    let opts = BuildOptions::new(ColumnSpec::new(1, 0)?, RowOrder::Lexical);
    let pm = PresenceMatrix::from_paths(&values, &input, &opts)?;
    assert_eq!(pm.n_discarded(), 1);

    let mut buf = Vec::new();
    pm.write_csv_to(&mut buf)?;
    assert_eq!(
        String::from_utf8(buf)?,
        ",red,blue\nsample_a,1,1\nsample_b,1,0\n"
    );
    Ok(())
}
