use rtnpx::encoder::encode_grid;
use rtnpx::grid::{render_grid, Grid};
use rtnpx::layout::{CellGeometry, Direction};
use rtnpx::{render_svg, RenderError, RenderParams, RenderRequest};
use url::form_urlencoded;

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}

fn request(d: &str, data: &str, query: &str) -> RenderRequest {
    RenderRequest::from_path(
        d,
        "20",
        "20",
        data,
        form_urlencoded::parse(query.as_bytes()).into_owned(),
    )
}

fn query(pairs: &[(&str, &str)]) -> RenderRequest {
    RenderRequest::from_query(pairs.iter().copied())
}

fn fills(svg: &str) -> Vec<&str> {
    svg.split("<rect ")
        .skip(1)
        .filter_map(|rect| rect.split(r#"fill=""#).nth(1))
        .filter_map(|rest| rest.split('"').next())
        .collect()
}

/// Render through the text encoding and compare with the direct render
fn assert_round_trip(grid: &Grid, colors: &[&str]) {
    let palette = palette(colors);
    let encoded = encode_grid(grid, &palette);
    assert!(!encoded.is_empty());

    let via_text = render_svg(&request("r", &encoded.data, &encoded.query)).unwrap();
    let params = RenderParams::new(Direction::Right, CellGeometry::new(20.0, 20.0));
    let direct = render_grid(grid, &palette, &params);
    assert_eq!(via_text, direct, "encoded as {}?{}", encoded.data, encoded.query);
}

/// Fills of the decoded grid, column by column from the bottom row
fn decoded_fills(grid: &Grid, colors: &[&str]) -> Vec<String> {
    let encoded = encode_grid(grid, &palette(colors));
    let svg = render_svg(&request("r", &encoded.data, &encoded.query)).unwrap();
    fills(&svg).into_iter().map(str::to_string).collect()
}

#[test]
fn test_round_trip_single_color() {
    let grid = Grid::from_rows(vec![vec![0, 1, 0], vec![1, 1, 1]]);
    assert_round_trip(&grid, &["#ff0000"]);
}

#[test]
fn test_round_trip_many_colors_and_gaps() {
    let grid = Grid::from_rows(vec![
        vec![3, 0, 0, 2],
        vec![3, 0, 1, 2],
        vec![0, 0, 1, 0],
        vec![2, 0, 1, 3],
    ]);
    assert_round_trip(&grid, &["#111111", "#00ff00", "rgb(1,2,3)"]);
}

#[test]
fn test_round_trip_sentinel_and_missing_slots() {
    // Slot 1 holds the builtin color and slot 4 is not in the palette
    let grid = Grid::from_rows(vec![vec![1, 2], vec![4, 1]]);
    assert_round_trip(&grid, &["#2c7be5", "#abcdef"]);
}

#[test]
fn test_builtin_slot_one_keeps_its_color() {
    let grid = Grid::from_rows(vec![vec![1, 2]]);
    let colors = ["#2c7be5", "#ff0000"];
    assert_eq!(decoded_fills(&grid, &colors), vec!["#2c7be5", "#ff0000"]);
    assert_round_trip(&grid, &colors);
}

#[test]
fn test_missing_slot_uses_builtin_color() {
    let grid = Grid::from_rows(vec![vec![1, 2]]);
    assert_eq!(decoded_fills(&grid, &["#00ff00"]), vec!["#00ff00", "#2c7be5"]);
    assert_round_trip(&grid, &["#00ff00"]);
}

#[test]
fn test_builtin_slot_beside_painted_slot_one() {
    let grid = Grid::from_rows(vec![vec![1, 2, 3]]);
    let colors = ["#ff0000", "#2c7be5", "not a color"];
    assert_eq!(decoded_fills(&grid, &colors), vec!["#ff0000", "#2c7be5", "#2c7be5"]);
    assert_round_trip(&grid, &colors);
}

#[test]
fn test_round_trip_empty_top_rows() {
    let grid = Grid::from_rows(vec![vec![0, 0], vec![0, 0], vec![0, 2]]);
    assert_round_trip(&grid, &["#000000", "#ffffff"]);
}

#[test]
fn test_both_dialects_render_the_same_picture() {
    let v1 = render_svg(&request("r", "3,,2:2", "")).unwrap();
    let v2 = render_svg(&request("r", "1-3/_/2", "")).unwrap();
    assert_eq!(v1, v2);
}

#[test]
fn test_reversed_range_is_normalized() {
    let reversed = render_svg(&request("r", "5-2", "")).unwrap();
    let forward = render_svg(&request("r", "2-5", "")).unwrap();
    assert_eq!(reversed, forward);
    assert_eq!(forward.matches("<rect").count(), 4);
}

#[test]
fn test_palette_priority() {
    let svg = render_svg(&request(
        "r",
        "~c2_5.c9",
        "pal_c2=111111&pal_c9=not-a-color&color=222222",
    ))
    .unwrap();
    assert!(svg.contains(r##"fill="#111111""##));
    assert!(!svg.contains("222222"));
}

#[test]
fn test_label_forms_precedence() {
    // Explicit index beats the shorthand list, which beats the generic form
    let req = request("r", "1-3", "row2=two&rows=a,b,c&label=y:x,y,z");
    let svg = render_svg(&req).unwrap();
    assert!(svg.contains(">a</text>"));
    assert!(svg.contains(">two</text>"));
    assert!(svg.contains(">c</text>"));
    assert!(!svg.contains(">b</text>"));
    assert!(!svg.contains(">z</text>"));
}

#[test]
fn test_row_labels_reserve_margin() {
    // 2 x 3 cells of 20: content 40 x 60, plus 56 label margin and 8 padding
    let svg = render_svg(&request("r", "1-3/1-3", "rows=a,b,c")).unwrap();
    assert!(svg.contains(r#"width="112" height="76" viewBox="0 0 112 76""#));
    assert!(svg.contains(r#"<g transform="translate(8,8)">"#));
}

#[test]
fn test_query_form_request() {
    let svg = render_svg(&query(&[
        ("direction", "bottom"),
        ("width", "10"),
        ("height", "5"),
        ("data", "1-2"),
    ]))
    .unwrap();
    // Bottom orientation swaps the canvas: 2 rows of 5 by 1 column of 10
    assert!(svg.contains(r#"width="10" height="10""#));
}

#[test]
fn test_validation_errors() {
    assert_eq!(
        render_svg(&request("r", "1", "")).map(|_| ()),
        Ok(())
    );
    assert_eq!(
        render_svg(&query(&[("width", "20"), ("height", "20"), ("data", "1")])),
        Err(RenderError::MissingDirection)
    );
    assert_eq!(
        render_svg(&RenderRequest::from_path("r", "0", "20", "1", Vec::<(String, String)>::new())),
        Err(RenderError::InvalidDimension { name: "width", value: "0".into() })
    );
    assert_eq!(
        render_svg(&RenderRequest::from_path("r", "20", "abc", "1", Vec::<(String, String)>::new())),
        Err(RenderError::InvalidDimension { name: "height", value: "abc".into() })
    );
    assert_eq!(
        render_svg(&query(&[("direction", "r"), ("width", "0")])),
        Err(RenderError::MissingData)
    );
}
