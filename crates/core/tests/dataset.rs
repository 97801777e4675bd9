use tabset_core::{CellValue, Column, Dataset, DatasetError, FormatOptions, Package, Registry, Row, RowSlice};

fn people() -> Dataset {
    let mut data = Dataset::new().with_headers(["name", "age"]).unwrap();
    data.append(vec![CellValue::from("John"), CellValue::from(90)]).unwrap();
    data.append(vec![CellValue::from("George"), CellValue::from(67)]).unwrap();
    data
}

// ===== Dimension Tests =====

#[test]
fn test_append_wrong_width_fails() {
    let mut data = people();

    let result = data.append(vec!["Paul"]);
    assert!(matches!(result, Err(DatasetError::InvalidDimensions { expected: 2, actual: 1 })));
    // Unchanged after the failed mutation
    assert_eq!(data.height(), 2);
    assert_eq!(data.width(), 2);
}

#[test]
fn test_failed_extend_leaves_rows() {
    let mut data = people();

    let result = data.extend(vec![
        vec![CellValue::from("Paul"), CellValue::from(80)],
        vec![CellValue::from("Ringo")],
    ]);
    assert!(matches!(result, Err(DatasetError::InvalidDimensions { expected: 2, actual: 1 })));
    assert_eq!(data.height(), 2);
    assert_eq!(data.get_row(-1).unwrap()[0], CellValue::from("George"));
}

#[test]
fn test_failed_set_dict_leaves_dataset() {
    let mut data = people();
    let before = data.dict().unwrap();

    let ragged = Package::Grid(vec![
        vec![CellValue::from(9), CellValue::from(9)],
        vec![CellValue::from(9)],
    ]);
    assert!(data.set_dict(ragged).is_err());
    assert_eq!(data.headers().unwrap(), &["name".to_string(), "age".to_string()]);
    assert_eq!(data.dict().unwrap(), before);
}

#[test]
fn test_failed_import_leaves_dataset() {
    let mut data = people().with_title("staff");
    let before = data.dict().unwrap();

    let result = data.import_with(Registry::global(), "a,b\n1,2\n3,4,5\n", Some("csv"), &FormatOptions::default());
    assert!(matches!(result, Err(DatasetError::InvalidDimensions { .. })));
    assert_eq!(data.dict().unwrap(), before);

    let result = data.import_with(Registry::global(), "[[1, 2], [3]]", Some("json"), &FormatOptions::default());
    assert!(result.is_err());
    assert_eq!(data.dict().unwrap(), before);
    assert_eq!(data.title(), Some("staff"));
}

#[test]
fn test_every_row_matches_width() {
    let mut data = people();
    data.insert(0, vec![CellValue::from("Ringo"), CellValue::from(80)]).unwrap();
    data.lpush(vec![CellValue::from("Pete"), CellValue::from(81)]).unwrap();
    data.append_col(vec![1, 2, 3, 4], Some("id")).unwrap();
    assert!(data.set_row(0, vec!["too", "short"]).is_err());
    assert!(data.insert_col(0, vec![1], Some("bad")).is_err());

    assert!(data.rows().all(|row| row.len() == data.width()));
    assert_eq!(data.width(), 3);
}

#[test]
fn test_headers_must_match_width() {
    let mut data = people();
    assert!(data.set_headers(["only"]).is_err());
    assert_eq!(data.headers().unwrap().len(), 2);
}

#[test]
fn test_first_row_fixes_width() {
    let mut data = Dataset::new();
    data.append(vec![1, 2, 3]).unwrap();
    assert_eq!(data.width(), 3);
    assert!(data.append(vec![1, 2]).is_err());
}

// ===== Column Tests =====

#[test]
fn test_insert_col_needs_header_when_headers_set() {
    let mut data = people();

    let result = data.insert_col(data.width(), vec![10, 20], None);
    assert!(matches!(result, Err(DatasetError::HeadersNeeded(_))));
    assert_eq!(data.width(), 2);
}

#[test]
fn test_column_access_and_delete() {
    let mut data = people();
    data.append_col(vec!["NYC", "LA"], Some("city")).unwrap();

    assert_eq!(data.column("city").unwrap(), vec![CellValue::from("NYC"), CellValue::from("LA")]);
    assert_eq!(data.get_col(0).unwrap()[1], CellValue::from("George"));
    assert!(matches!(data.column("missing"), Err(DatasetError::ColumnNotFound { .. })));

    let removed = data.delete_column("age").unwrap();
    assert_eq!(removed, vec![CellValue::from(90), CellValue::from(67)]);
    assert_eq!(data.headers().unwrap(), &["name".to_string(), "city".to_string()]);
}

#[test]
fn test_computed_column() {
    let mut data = people();
    data.append_col_with(|row: &Row| CellValue::from(row[1].as_int().unwrap_or(0) * 2), Some("double"))
        .unwrap();
    assert_eq!(data.column("double").unwrap(), vec![CellValue::from(180), CellValue::from(134)]);
}

#[test]
fn test_empty_dataset_column_bootstraps_headers() {
    let mut data = Dataset::new();
    data.append_col(vec!["a", "b"], Some("letter")).unwrap();
    assert_eq!(data.height(), 2);
    assert_eq!(data.headers().unwrap(), &["letter".to_string()]);
}

// ===== Row Access Tests =====

#[test]
fn test_negative_index_and_slices() {
    let mut data = Dataset::new();
    data.extend((0..5).map(|i| vec![i])).unwrap();

    assert_eq!(data.get_row(-1).unwrap(), vec![CellValue::from(4)]);
    assert!(matches!(data.get_row(5), Err(DatasetError::IndexOutOfBounds { .. })));

    let evens = data.slice(RowSlice::full().with_step(2)).unwrap();
    assert_eq!(evens.len(), 3);
    let reversed = data.slice(RowSlice::full().with_step(-1)).unwrap();
    assert_eq!(reversed[0], vec![CellValue::from(4)]);
    assert!(matches!(data.slice(RowSlice::full().with_step(0)), Err(DatasetError::ZeroSliceStep)));

    assert_eq!(data.delete_rows(RowSlice::new(Some(1), Some(3))).unwrap(), 2);
    assert_eq!(data.height(), 3);
}

#[test]
fn test_pops() {
    let mut data = people();
    assert_eq!(data.lpop().unwrap()[0], CellValue::from("John"));
    assert_eq!(data.pop().unwrap()[0], CellValue::from("George"));
    assert!(data.rpop().is_err());
    // Headers survive emptying the rows
    assert_eq!(data.width(), 2);
}

// ===== Tag Tests =====

#[test]
fn test_filter_by_tags() {
    let mut data = Dataset::new().with_headers(["city"]).unwrap();
    data.append_tagged(vec!["Oslo"], &["north", "capital"]).unwrap();
    data.append_tagged(vec!["Rome"], &["south", "capital"]).unwrap();
    data.append(vec!["Turin"]).unwrap();

    assert_eq!(data.filter("capital").height(), 2);
    assert_eq!(data.filter("north").get_row(0).unwrap(), vec![CellValue::from("Oslo")]);
    assert_eq!(data.filter_any(&["north", "south"]).height(), 2);
    assert_eq!(data.filter("west").height(), 0);
    assert_eq!(data.filter("west").headers(), data.headers());
}

// ===== Transformation Tests =====

#[test]
fn test_sort_is_ordered_and_stable() {
    let mut data = Dataset::new().with_headers(["k", "v"]).unwrap();
    for (k, v) in [(3, "a"), (1, "b"), (3, "c"), (2, "d"), (1, "e")] {
        data.append(vec![CellValue::from(k), CellValue::from(v)]).unwrap();
    }

    let sorted = data.sort("k", false).unwrap();
    let keys = sorted.column("k").unwrap();
    assert!(keys.windows(2).all(|w| w[0].compare(&w[1]).is_le()));
    assert_eq!(
        sorted.column("v").unwrap(),
        ["b", "e", "d", "a", "c"].map(CellValue::from).to_vec()
    );

    let reversed = data.sort(Column::Index(0), true).unwrap();
    assert_eq!(reversed.get_row(0).unwrap()[0], CellValue::from(3));
    // Source untouched
    assert_eq!(data.get_row(0).unwrap()[0], CellValue::from(3));
}

#[test]
fn test_sort_by_name_needs_headers() {
    let data = Dataset::from_rows(vec![vec![2], vec![1]]).unwrap();
    assert!(matches!(data.sort("x", false), Err(DatasetError::HeadersNeeded(_))));
    assert_eq!(data.sort(0usize, false).unwrap().get_row(0).unwrap(), vec![CellValue::from(1)]);
}

#[test]
fn test_transpose_twice_restores() {
    let mut data = Dataset::new().with_headers(["fruit", "jan", "feb"]).unwrap();
    data.append(vec!["apple", "1", "2"]).unwrap();
    data.append(vec!["pear", "3", "4"]).unwrap();

    let transposed = data.transpose().unwrap();
    assert_eq!(
        transposed.headers().unwrap(),
        &["fruit".to_string(), "apple".to_string(), "pear".to_string()]
    );
    assert_eq!(transposed.height(), 2);

    let restored = transposed.transpose().unwrap();
    assert_eq!(restored.headers(), data.headers());
    assert_eq!(restored.dict().unwrap(), data.dict().unwrap());
}

#[test]
fn test_transpose_twice_restores_typed_pivot() {
    let mut data = Dataset::new().with_headers(["id", "v"]).unwrap();
    data.append(vec![CellValue::from(1), CellValue::from("a")]).unwrap();
    data.append(vec![CellValue::from(2), CellValue::from("b")]).unwrap();

    let transposed = data.transpose().unwrap();
    assert_eq!(transposed.headers().unwrap(), &["id", "1", "2"].map(String::from));

    let restored = transposed.transpose().unwrap();
    assert_eq!(restored.dict().unwrap(), data.dict().unwrap());
    assert_eq!(restored.get_row(0).unwrap()[0], CellValue::Int(1));
}

#[test]
fn test_stack_and_stack_cols() {
    let stacked = people().stack(&people()).unwrap();
    assert_eq!(stacked.height(), 4);

    let mut cities = Dataset::new().with_headers(["city"]).unwrap();
    cities.append(vec!["NYC"]).unwrap();
    cities.append(vec!["LA"]).unwrap();
    let wide = people().stack_cols(&cities).unwrap();
    assert_eq!(wide.width(), 3);
    assert_eq!(wide.headers().unwrap()[2], "city");

    let narrow = Dataset::new().with_headers(["x"]).unwrap();
    assert!(people().stack(&narrow).is_err());
    assert!(people().stack_cols(&narrow).is_err());
}

#[test]
fn test_remove_duplicates_is_idempotent() {
    let mut data = people();
    data.extend(people().rows().map(Row::to_vec)).unwrap();
    assert_eq!(data.height(), 4);

    assert_eq!(data.remove_duplicates(), 2);
    assert_eq!(data.height(), 2);
    assert_eq!(data.remove_duplicates(), 0);
    assert_eq!(data.get_row(0).unwrap()[0], CellValue::from("John"));
}

#[test]
fn test_subset() {
    let data = people();
    let subset = data.subset(Some(&[1, 9][..]), Some(&["age", "nope"][..])).unwrap();
    assert_eq!(subset.headers().unwrap(), &["age".to_string()]);
    assert_eq!(subset.get_row(0).unwrap(), vec![CellValue::from(67)]);
    assert_eq!(subset.height(), 1);
}

// ===== Formatter and Separator Tests =====

#[test]
fn test_formatters_apply_on_export_only() {
    let mut data = people();
    data.add_formatter("name", |v: &CellValue| CellValue::from(v.as_str().to_uppercase()))
        .unwrap();

    assert_eq!(data.to_csv().unwrap(), "name,age\r\nJOHN,90\r\nGEORGE,67\r\n");
    assert_eq!(data.get_row(0).unwrap()[0], CellValue::from("John"));
    assert!(matches!(
        data.add_formatter(5usize, |v: &CellValue| v.clone()),
        Err(DatasetError::InvalidDatasetIndex { .. })
    ));
}

#[test]
fn test_separators_do_not_count_as_rows() {
    let mut data = people();
    data.append_separator("totals");
    data.insert_separator(1, "top");
    assert_eq!(data.height(), 2);
    assert_eq!(data.separators().len(), 2);
}

// ===== Dict Tests =====

#[test]
fn test_dict_round_trip() {
    let data = people();
    let mut copy = Dataset::new();
    copy.set_dict(data.dict().unwrap()).unwrap();

    assert_eq!(copy.dict().unwrap(), data.dict().unwrap());
    assert_eq!(copy.headers(), data.headers());
}

#[test]
fn test_dict_without_headers_is_grid() {
    let data = Dataset::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
    let Package::Grid(rows) = data.dict().unwrap() else {
        panic!("expected plain rows");
    };
    assert_eq!(rows.len(), 2);

    let mut copy = people();
    copy.set_dict(Package::Grid(rows)).unwrap();
    assert!(copy.headers().is_none());
    assert_eq!(copy.height(), 2);
}

#[test]
fn test_empty_dict_is_noop() {
    let mut data = people();
    data.set_dict(Package::Grid(Vec::new())).unwrap();
    assert_eq!(data.height(), 2);
}

#[test]
fn test_wipe_keeps_title() {
    let mut data = people().with_title("staff");
    data.wipe();
    assert!(data.is_empty());
    assert!(data.headers().is_none());
    assert_eq!(data.title(), Some("staff"));
}
