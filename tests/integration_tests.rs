//! End-to-end tests: model assertions, round-trips across the full style
//! matrix, tolerant-mode error collection, and writer behavior.

use ciftext::{
    parse, parse_with_options, to_string, to_string_with_options, CaseFold, CifBlock, CifCategory,
    CifFile, CifItem, Delimiter, Dialect, ListStyle, ParseError, ParseOptions, RaiseLevel,
    TableStyle, WriteError, WriteOptions,
};

const FIXTURE: &str = "\
data_demo
_cell.length_a 10.0
_cell.length_b 20.0
_struct.title 'a title with spaces'
_exptl.notes
;multi
line notes
;
loop_
_atom_site.id
_atom_site.label
_atom_site.note
1 C1 ?
2 'N 2' .
data_second
_refine.method xray
";

fn single_value_file(value: &str) -> CifFile {
    let fold = CaseFold::None;
    let category = CifCategory::from_items(
        "s",
        vec![CifItem::new("v", vec![value.to_string()])],
        false,
        fold,
    )
    .unwrap();
    let mut block = CifBlock::new("b", fold);
    block.push_category(category).unwrap();
    let mut file = CifFile::new(Dialect::MmCif, fold);
    file.push_block(block).unwrap();
    file
}

// --- The model built from text ---

#[test]
fn single_pairs_build_one_category_per_prefix() {
    let file = parse("data_x\n_cell.length_a 10.0\n_cell.length_b 20.0\n").unwrap();
    let block = file.blocks().by_name("x").unwrap();
    let cell = block.categories().by_name("cell").unwrap();
    assert_eq!(cell.rows(), 1);
    assert!(!cell.is_tabular());
    assert_eq!(cell.items().by_name("length_a").unwrap().values(), ["10.0"]);
    assert_eq!(cell.items().by_name("length_b").unwrap().values(), ["20.0"]);
}

#[test]
fn loops_build_tabular_categories() {
    let file = parse("data_x\nloop_\n_atom_site.id\n_atom_site.symbol\n1 C\n2 N\n").unwrap();
    let atoms = file
        .blocks()
        .by_name("x")
        .unwrap()
        .categories()
        .by_name("atom_site")
        .unwrap();
    assert!(atoms.is_tabular());
    assert_eq!(atoms.rows(), 2);
    assert_eq!(atoms.items().by_name("id").unwrap().values(), ["1", "2"]);
    assert_eq!(atoms.items().by_name("symbol").unwrap().values(), ["C", "N"]);
}

#[test]
fn loop_arity_must_divide_evenly() {
    let err = parse("data_x\nloop_\n_a.x\n_a.y\n1 2 3 4 5\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::LoopRowMismatch {
            tags: 2,
            values: 5,
            ..
        }
    ));
}

#[test]
fn fixture_parses_fully() {
    let file = parse(FIXTURE).unwrap();
    assert_eq!(file.blocks().len(), 2);
    let demo = file.blocks().by_name("demo").unwrap();
    assert_eq!(demo.categories().len(), 4);
    assert_eq!(
        demo.categories().by_name("struct").unwrap().items().by_name("title").unwrap().get(0),
        Some("a title with spaces")
    );
    assert_eq!(
        demo.categories().by_name("exptl").unwrap().items().by_name("notes").unwrap().get(0),
        Some("multi\nline notes")
    );
    let atoms = demo.categories().by_name("atom_site").unwrap();
    assert_eq!(atoms.rows(), 2);
    assert_eq!(atoms.items().by_name("label").unwrap().values(), ["C1", "N 2"]);
    assert!(!file.is_dictionary());
}

// --- Round-trips across the style matrix ---

#[test]
fn round_trip_under_every_style_combination() {
    let file = parse(FIXTURE).unwrap();
    let list_styles = [ListStyle::Horizontal, ListStyle::Tabular, ListStyle::Vertical];
    let table_styles = [
        TableStyle::Horizontal,
        TableStyle::TabularHorizontal,
        TableStyle::TabularVertical,
        TableStyle::Vertical,
    ];
    for list_style in list_styles {
        for table_style in table_styles {
            let options = WriteOptions::new()
                .with_list_style(list_style)
                .with_table_style(table_style);
            let written = to_string_with_options(&file, &options).unwrap();
            let again = parse(&written).unwrap_or_else(|err| {
                panic!("re-parse failed under {list_style:?}/{table_style:?}: {err}\n{written}")
            });
            assert_eq!(again, file, "model drift under {list_style:?}/{table_style:?}");
        }
    }
}

#[test]
fn round_trip_with_spacing_and_indentation() {
    let file = parse(FIXTURE).unwrap();
    let options = WriteOptions::new()
        .with_indent(2)
        .with_indent_inner(3)
        .with_space_items(4)
        .with_min_space_columns(5);
    let written = to_string_with_options(&file, &options).unwrap();
    assert_eq!(parse(&written).unwrap(), file);
}

#[test]
fn round_trip_with_double_quote_preference() {
    let file = parse(FIXTURE).unwrap();
    let options = WriteOptions::new().with_delimiter_preference(vec![
        Delimiter::Double,
        Delimiter::Single,
        Delimiter::TextField,
    ]);
    let written = to_string_with_options(&file, &options).unwrap();
    assert!(written.contains("\"a title with spaces\""));
    assert_eq!(parse(&written).unwrap(), file);
}

#[test]
fn round_trip_preserves_single_row_loops() {
    let file = parse("data_x\nloop_\n_a.x\n_a.y\n1 2\n").unwrap();
    let written = to_string(&file).unwrap();
    assert!(written.contains("loop_"));
    let again = parse(&written).unwrap();
    assert!(again
        .blocks()
        .by_name("x")
        .unwrap()
        .categories()
        .by_name("a")
        .unwrap()
        .is_tabular());
    assert_eq!(again, file);
}

#[test]
fn round_trip_under_case_folding() {
    let options = ParseOptions::new().with_case_fold(CaseFold::Lower);
    let parsed = parse_with_options("data_DEMO\n_Cell.Length_A 10.0\n", &options).unwrap();
    let written = to_string(&parsed.file).unwrap();
    assert!(written.contains("data_demo"));
    assert!(written.contains("_cell.length_a"));
    let again = parse_with_options(&written, &options).unwrap();
    assert_eq!(again.file, parsed.file);
}

// --- Exact layout ---

#[test]
fn list_tabular_aligns_values() {
    let file = parse("data_x\n_cell.length_a 10.0\n_cell.angle 90\n").unwrap();
    assert_eq!(
        to_string(&file).unwrap(),
        "data_x\n_cell.length_a  10.0\n_cell.angle     90\n"
    );
}

#[test]
fn table_tabular_horizontal_aligns_columns() {
    let file = parse("data_x\nloop_\n_a.id\n_a.name\n1 carbon\n22 n\n").unwrap();
    assert_eq!(
        to_string(&file).unwrap(),
        "data_x\nloop_\n_a.id  _a.name\n1      carbon\n22     n\n"
    );
}

#[test]
fn table_vertical_one_token_per_line() {
    let file = parse("data_x\nloop_\n_a.x\n_a.y\n1 2\n3 4\n").unwrap();
    let options = WriteOptions::new().with_table_style(TableStyle::Vertical);
    assert_eq!(
        to_string_with_options(&file, &options).unwrap(),
        "data_x\nloop_\n_a.x\n_a.y\n1\n2\n3\n4\n"
    );
}

#[test]
fn list_horizontal_spacing() {
    let file = parse("data_x\n_cell.a 1\n_cell.b 2\n").unwrap();
    let options = WriteOptions::new()
        .with_list_style(ListStyle::Horizontal)
        .with_space_items(3);
    assert_eq!(
        to_string_with_options(&file, &options).unwrap(),
        "data_x\n_cell.a 1   _cell.b 2\n"
    );
}

#[test]
fn indentation_prefixes_category_lines() {
    let file = parse("data_x\n_cell.a 1\n").unwrap();
    let options = WriteOptions::new().with_indent(2);
    assert_eq!(
        to_string_with_options(&file, &options).unwrap(),
        "data_x\n  _cell.a  1\n"
    );
}

#[test]
fn text_fields_always_start_at_column_one() {
    let file = parse("data_x\n_s.v\n;multi\nline\n;\n").unwrap();
    let options = WriteOptions::new().with_indent(4);
    let written = to_string_with_options(&file, &options).unwrap();
    assert!(written.contains("\n;multi\nline\n;"));
    assert_eq!(parse(&written).unwrap(), file);
}

#[test]
fn loop_with_text_field_values_round_trips() {
    let file = parse("data_x\nloop_\n_a.c1\n_a.c2\n1\n;long\ntext\n;\n2 short\n").unwrap();
    for table_style in [
        TableStyle::Horizontal,
        TableStyle::TabularHorizontal,
        TableStyle::TabularVertical,
        TableStyle::Vertical,
    ] {
        let options = WriteOptions::new().with_table_style(table_style);
        let written = to_string_with_options(&file, &options).unwrap();
        assert_eq!(
            parse(&written).unwrap(),
            file,
            "model drift under {table_style:?}:\n{written}"
        );
    }
}

#[test]
fn dictionary_frames_round_trip() {
    let text = "data_dict\n_dictionary.title demo\nsave_cell\n_category.id cell\nloop_\n_item.name\n_item.code\na 1\nb 2\nsave_\nsave_atom\n_category.id atom\nsave_\n";
    let file = parse(text).unwrap();
    assert!(file.is_dictionary());
    let block = file.blocks().by_name("dict").unwrap();
    assert_eq!(block.frames().len(), 2);
    let written = to_string(&file).unwrap();
    assert!(written.contains("save_cell"));
    assert!(written.ends_with("save_\n"));
    assert_eq!(parse(&written).unwrap(), file);
}

// --- Quoting decisions ---

#[test]
fn spaced_value_takes_preferred_quote() {
    let written = to_string(&single_value_file("a b")).unwrap();
    assert!(written.contains("'a b'"));
}

#[test]
fn multiline_value_forces_text_field_over_quotes() {
    let written = to_string(&single_value_file("multi\nline")).unwrap();
    assert!(written.contains("\n;multi\nline\n;"));
    let again = parse(&written).unwrap();
    assert_eq!(again, single_value_file("multi\nline"));
}

#[test]
fn value_unsafe_for_single_quotes_falls_back_to_double() {
    // The inner single quote sits before a space, so '…' cannot hold it.
    let written = to_string(&single_value_file("don' t")).unwrap();
    assert!(written.contains("\"don' t\""));
}

#[test]
fn sentinels_round_trip_bare() {
    let written = to_string(&single_value_file("?")).unwrap();
    assert!(written.contains("_s.v  ?\n"));
    let written = to_string(&single_value_file(".")).unwrap();
    assert!(written.contains("_s.v  .\n"));
}

#[test]
fn empty_value_round_trips_quoted() {
    let file = single_value_file("");
    let written = to_string(&file).unwrap();
    assert!(written.contains("''"));
    assert_eq!(parse(&written).unwrap(), file);
}

#[test]
fn reserved_looking_values_are_quoted() {
    for value in ["loop_", "data_x", "save_", "stop_", "global_y", "_tag", "#x", ";x"] {
        let file = single_value_file(value);
        let written = to_string(&file).unwrap();
        let again = parse(&written)
            .unwrap_or_else(|err| panic!("value {value:?} did not round-trip: {err}\n{written}"));
        assert_eq!(again, file, "value {value:?}");
    }
}

#[test]
fn always_table_forces_loop_form() {
    let file = parse("data_x\n_cell.length_a 10.0\n").unwrap();
    let options = WriteOptions::new().with_always_table(true);
    let written = to_string_with_options(&file, &options).unwrap();
    assert!(written.contains("loop_"));
    // The values survive; the category comes back marked tabular.
    let again = parse(&written).unwrap();
    let cell = again.blocks().by_name("x").unwrap().categories().by_name("cell").unwrap();
    assert!(cell.is_tabular());
    assert_eq!(cell.items().by_name("length_a").unwrap().values(), ["10.0"]);
}

// --- Writer failure modes ---

#[test]
fn value_with_no_safe_delimiter_fails_fast() {
    // Both quote characters in closing positions, and no text-field fallback.
    let file = single_value_file("a' b\"");
    let options =
        WriteOptions::new().with_delimiter_preference(vec![Delimiter::Single, Delimiter::Double]);
    let err = to_string_with_options(&file, &options).unwrap_err();
    assert!(matches!(err, WriteError::NoSafeDelimiter { .. }));
}

#[test]
fn multiline_without_text_field_preference_fails() {
    let file = single_value_file("a\nb");
    let options =
        WriteOptions::new().with_delimiter_preference(vec![Delimiter::Single, Delimiter::Double]);
    let err = to_string_with_options(&file, &options).unwrap_err();
    assert!(matches!(err, WriteError::NoSafeDelimiter { .. }));
}

#[test]
fn line_initial_semicolon_is_unrepresentable() {
    let file = single_value_file("first\n;second");
    let err = to_string(&file).unwrap_err();
    assert!(matches!(err, WriteError::UnrepresentableValue { .. }));
}

#[test]
fn empty_preference_list_is_rejected() {
    let file = single_value_file("anything");
    let options = WriteOptions::new().with_delimiter_preference(Vec::new());
    let err = to_string_with_options(&file, &options).unwrap_err();
    assert_eq!(err, WriteError::EmptyDelimiterPreference);
}

// --- Tolerant parsing ---

#[test]
fn fatal_only_collects_recoverable_errors() {
    let text = "data_x\nloop_\n_a.x\n_a.y\n1 2 3\n_plain v\n_a.x 9\n";
    let options = ParseOptions::new().with_raise_level(RaiseLevel::FatalOnly);
    let parsed = parse_with_options(text, &options).unwrap();
    assert_eq!(parsed.errors.len(), 3);
    assert!(matches!(parsed.errors[0], ParseError::LoopRowMismatch { .. }));
    assert!(matches!(parsed.errors[1], ParseError::DialectViolation { .. }));
    assert!(matches!(parsed.errors[2], ParseError::DuplicateTag { .. }));
    // The loop kept its one complete row.
    let a = parsed.file.blocks().by_name("x").unwrap().categories().by_name("a").unwrap();
    assert_eq!(a.rows(), 1);
}

#[test]
fn errors_only_collects_advisories_but_raises_errors() {
    let options = ParseOptions::new().with_raise_level(RaiseLevel::ErrorsOnly);
    let parsed = parse_with_options("data_x\nloop_rows\n_a.x\n1\n", &options).unwrap();
    assert!(matches!(parsed.errors[0], ParseError::NamedLoop { .. }));

    let err = parse_with_options("data_x\nloop_\n_a.x\n_a.y\n1 2 3\n", &options).unwrap_err();
    assert!(matches!(err, ParseError::LoopRowMismatch { .. }));
}

#[test]
fn strict_mode_never_returns_errors_in_list() {
    let parsed = parse_with_options(FIXTURE, &ParseOptions::default()).unwrap();
    assert!(parsed.errors.is_empty());
}

// --- A realistic mmCIF snippet ---

#[test]
fn realistic_mmcif_snippet() {
    let text = r#"data_1ABC
_cell.length_a   50.000
_cell.length_b   60.000
_cell.length_c   70.000
_symmetry.space_group_name_H-M 'P 21 21 21'
loop_
_atom_site.group_PDB
_atom_site.label_atom_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
ATOM N  10.000 20.000 30.000
ATOM CA 11.000 21.000 31.000
ATOM C  12.000 22.000 32.000
"#;
    let file = parse(text).unwrap();
    let block = file.blocks().by_name("1ABC").unwrap();
    assert_eq!(
        block.categories().by_name("cell").unwrap().items().by_name("length_a").unwrap().get(0),
        Some("50.000")
    );
    assert_eq!(
        block
            .categories()
            .by_name("symmetry")
            .unwrap()
            .items()
            .by_name("space_group_name_H-M")
            .unwrap()
            .get(0),
        Some("P 21 21 21")
    );
    let atoms = block.categories().by_name("atom_site").unwrap();
    assert_eq!(atoms.rows(), 3);
    assert_eq!(atoms.items().by_name("label_atom_id").unwrap().get(1), Some("CA"));

    let written = to_string(&file).unwrap();
    assert_eq!(parse(&written).unwrap(), file);
}

// --- Model serialization for downstream consumers ---

#[test]
fn model_exposes_ordered_json() {
    let file = parse("data_x\nloop_\n_a.id\n_a.sym\n1 C\n2 N\n").unwrap();
    let json = serde_json::to_value(&file).unwrap();
    assert_eq!(json["blocks"]["x"]["categories"]["a"]["items"]["id"]["values"][1], "2");
    assert_eq!(json["blocks"]["x"]["categories"]["a"]["tabular"], true);
}
