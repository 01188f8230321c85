use std::fs;
use std::path::Path;

use tempfile::tempdir;
use xlf_populate::{ApplyOptions, Config, Cutoff, GlossaryKind, TranslationMapping, populate, run};

const XLIFF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file original="ui" source-language="en" target-language="fr" datatype="plaintext">
    <body>
      <trans-unit id="greeting">
        <source>Hello world</source>
      </trans-unit>
      <trans-unit id="placeholder">
        <source>Press <x id="1"/> to continue</source>
        <target>old</target>
      </trans-unit>
      <trans-unit id="missing">
        <source>Goodbye</source>
      </trans-unit>
    </body>
  </file>
</xliff>
"#;

fn config(dir: &Path, glossary: &Path) -> Config {
    Config {
        xliff: dir.join("ui.xlf"),
        glossary: glossary.to_path_buf(),
        glossary_kind: None,
        output: None,
        settings_path: None,
        preserve_tags: false,
        fuzzy: false,
        fuzzy_cutoff: None,
        preview: false,
        report_json: None,
    }
}

#[test]
fn populated_document_snapshot() {
    let mapping = TranslationMapping::from_delimited_rows([
        ["Hello world", "Bonjour le monde"],
        ["Press to continue", "Appuyez pour continuer"],
    ]);
    let options = ApplyOptions {
        preserve_tags: true,
        ..ApplyOptions::default()
    };
    let (stats, bytes) = populate(XLIFF.as_bytes(), &mapping, &options).expect("populate");
    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.unmatched, ["Goodbye"]);

    let output = String::from_utf8(bytes).expect("utf8");
    insta::assert_snapshot!(output.trim_end(), @r#"
<?xml version="1.0" encoding="UTF-8"?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file original="ui" source-language="en" target-language="fr" datatype="plaintext">
    <body>
      <trans-unit id="greeting">
        <source>Hello world</source>
        <target xml:space="preserve">Bonjour le monde</target>
      </trans-unit>
      <trans-unit id="placeholder">
        <source>Press <x id="1"/> to continue</source>
        <target xml:space="preserve">Appuyez pour continuer<x id="1"/></target>
      </trans-unit>
      <trans-unit id="missing">
        <source>Goodbye</source>
      </trans-unit>
    </body>
  </file>
</xliff>
"#);
}

#[test]
fn second_pass_produces_identical_output() {
    let mapping = TranslationMapping::from_delimited_rows([["Hello world", "Bonjour le monde"]]);
    let options = ApplyOptions::default();
    let (_, first) = populate(XLIFF.as_bytes(), &mapping, &options).expect("first pass");
    let (stats, second) = populate(&first, &mapping, &options).expect("second pass");
    assert_eq!(stats.inserted, 1);
    assert_eq!(first, second);
}

#[test]
fn compact_documents_get_indented() {
    let xml = r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2"><file><body><trans-unit id="1"><source>Hello world</source></trans-unit></body></file></xliff>"#;
    let mapping = TranslationMapping::from_delimited_rows([["Hello world", "Bonjour"]]);
    let (_, bytes) = populate(xml.as_bytes(), &mapping, &ApplyOptions::default()).expect("populate");
    let output = String::from_utf8(bytes).expect("utf8");
    assert!(output.contains(
        "      <trans-unit id=\"1\">\n        <source>Hello world</source>\n        <target xml:space=\"preserve\">Bonjour</target>\n      </trans-unit>"
    ));
}

#[test]
fn fuzzy_example_from_typo() {
    let xml = r#"<xliff><file><body><trans-unit id="t"><source>Helo world</source></trans-unit></body></file></xliff>"#;
    let mapping = TranslationMapping::from_delimited_rows([["Hello world", "Bonjour"]]);

    let loose = ApplyOptions {
        fuzzy: true,
        fuzzy_cutoff: Cutoff::new(0.85).expect("cutoff"),
        ..ApplyOptions::default()
    };
    let (stats, bytes) = populate(xml.as_bytes(), &mapping, &loose).expect("populate");
    assert_eq!(stats.inserted, 1);
    assert!(String::from_utf8(bytes).expect("utf8").contains(">Bonjour</target>"));

    let strict = ApplyOptions {
        fuzzy_cutoff: Cutoff::new(0.95).expect("cutoff"),
        ..loose
    };
    let (stats, _) = populate(xml.as_bytes(), &mapping, &strict).expect("populate");
    assert_eq!(stats.inserted, 0);
    assert_eq!(stats.unmatched, ["Helo world"]);
}

#[test]
fn latin1_input_is_written_back_as_utf8() {
    let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<xliff><file><body><trans-unit id=\"c\"><source>Caf\xe9 ouvert</source></trans-unit></body></file></xliff>";
    let mapping = TranslationMapping::from_delimited_rows([["Caf\u{e9} ouvert", "Caf\u{e9} open"]]);

    let (stats, bytes) = populate(xml, &mapping, &ApplyOptions::default()).expect("populate");
    assert_eq!(stats.inserted, 1);
    let output = String::from_utf8(bytes).expect("utf8");
    assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(output.contains(">Caf\u{e9} open</target>"));
}

#[test]
fn run_writes_output_and_report_from_csv() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("ui.xlf"), XLIFF).expect("write xliff");
    let csv = dir.path().join("glossary.csv");
    fs::write(&csv, "Hello world,Bonjour le monde\nGoodbye,Au revoir\n").expect("write csv");
    let report = dir.path().join("report.json");

    let mut cfg = config(dir.path(), &csv);
    cfg.report_json = Some(report.clone());
    cfg.preview = true;
    let output = run(cfg).expect("run");

    assert_eq!(output.output_path, dir.path().join("ui.updated.xlf"));
    assert_eq!(output.mapping_entries, 2);
    assert_eq!(output.stats.inserted, 2);
    assert_eq!(output.stats.unmatched, ["Press to continue"]);
    assert!(output.summary.starts_with("Mapping entries found: 2\nInserted/updated 2 <target> elements."));
    assert!(output.summary.contains("- Press to continue"));

    let written = fs::read_to_string(&output.output_path).expect("read output");
    assert!(written.contains("<target xml:space=\"preserve\">Au revoir</target>"));
    assert!(written.contains("<target>old</target>"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report).expect("read report")).expect("json");
    assert_eq!(json["inserted"], 2);
    assert_eq!(json["unmatched"][0], "Press to continue");
}

#[test]
fn run_leaves_no_output_on_malformed_xliff() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("ui.xlf"), "<xliff><file></xliff>").expect("write xliff");
    let csv = dir.path().join("glossary.csv");
    fs::write(&csv, "a,b\n").expect("write csv");

    let err = run(config(dir.path(), &csv)).expect_err("malformed");
    let root = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<xlf_populate::Error>())
        .expect("typed error");
    assert!(root.is_parse_error());
    assert!(!dir.path().join("ui.updated.xlf").exists());
}

#[test]
fn run_rejects_invalid_cutoff_and_unknown_glossary() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("ui.xlf"), XLIFF).expect("write xliff");
    let csv = dir.path().join("glossary.csv");
    fs::write(&csv, "a,b\n").expect("write csv");

    let mut cfg = config(dir.path(), &csv);
    cfg.fuzzy_cutoff = Some(1.5);
    assert!(run(cfg).is_err());

    let txt = dir.path().join("glossary.txt");
    fs::write(&txt, "a,b\n").expect("write txt");
    assert!(run(config(dir.path(), &txt)).is_err());

    let mut cfg = config(dir.path(), &txt);
    cfg.glossary_kind = Some(GlossaryKind::Csv);
    assert!(run(cfg).is_ok());
}
