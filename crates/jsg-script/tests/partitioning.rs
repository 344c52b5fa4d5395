use jsg_config::{parse_config, split_separators};
use jsg_core::codes;
use jsg_script::{partition, ScriptPlan};
use jsg_space::{span_parameter_space, InvocationRow, InvocationTable};
use proptest::prelude::*;

fn table_for(doc: &str) -> InvocationTable {
    let config = parse_config(doc).expect("config");
    span_parameter_space(&config).expect("space")
}

fn names(plans: &[ScriptPlan]) -> Vec<&str> {
    plans.iter().map(|plan| plan.file_name.as_str()).collect()
}

#[test]
fn five_graphs_split_a_hundred_rows_into_five_scripts() {
    let table = table_for(
        r#"{"batch_system": "slurm",
            "common_parameter_values": {"graphs": ["g0.el", "g1.el", "g2.el", "g3.el", "g4.el"]},
            "algorithms": [{"executable": "./bfs",
                "parameters_location": {"graphs": "-f", "threads": "-t"},
                "parameters_values": {"threads": "1:20"}}]}"#,
    );
    assert_eq!(table.len(), 100);
    let plans = partition(&table, &split_separators("graphs"), "script").unwrap();
    assert_eq!(
        names(&plans),
        [
            "run_g0_script.sh",
            "run_g1_script.sh",
            "run_g2_script.sh",
            "run_g3_script.sh",
            "run_g4_script.sh"
        ]
    );
    assert_eq!(plans.iter().map(|plan| plan.table.len()).sum::<usize>(), 100);
    for plan in &plans {
        assert_eq!(plan.table.distinct("graphs").len(), 1);
    }
}

#[test]
fn nested_separators_build_compound_names() {
    let table = table_for(
        r#"{"batch_system": "local",
            "algorithms": [{"executable": "./kc",
                "parameters_location": {"graphs": 1, "k": 2},
                "parameters_values": {"graphs": ["a.el", "b.el"], "k": "3:4"}}]}"#,
    );
    let plans = partition(&table, &split_separators("algorithms graphs k"), "x").unwrap();
    assert_eq!(
        names(&plans),
        [
            "run_kc_a_3_x.sh",
            "run_kc_a_4_x.sh",
            "run_kc_b_3_x.sh",
            "run_kc_b_4_x.sh"
        ]
    );
}

#[test]
fn rows_without_the_column_form_their_own_cell() {
    let table = table_for(
        r#"{"batch_system": "local",
            "algorithms": [
                {"executable": "./bfs", "parameters_location": {"graphs": 1},
                 "parameters_values": {"graphs": ["g1.el", "g2.el"]}},
                {"executable": "./tc", "parameters_location": {"k": "-k"},
                 "parameters_values": {"k": "3:4"}}
            ]}"#,
    );
    let plans = partition(&table, &split_separators("graphs"), "script").unwrap();
    assert_eq!(
        names(&plans),
        ["run_g1_script.sh", "run_g2_script.sh", "run_na_script.sh"]
    );
    assert_eq!(plans[2].table.len(), 2);
}

#[test]
fn colliding_tokens_get_numbered() {
    let table = table_for(
        r#"{"batch_system": "local",
            "algorithms": [{"executable": "./bfs", "parameters_location": {"graphs": 1},
                "parameters_values": {"graphs": ["a/road.el", "b/road.el"]}}]}"#,
    );
    let plans = partition(&table, &split_separators("graphs"), "s").unwrap();
    assert_eq!(names(&plans), ["run_road_s.sh", "run_road_2_s.sh"]);
}

const CROSSING_DOC: &str = r#"{"batch_system": "local",
    "algorithms": [{"executable": "./exe", "parameters_location": {"x": 1, "y": 2},
        "parameters_values": {"x": ["a", "a_b"], "y": ["b_c", "c"]}}]}"#;

#[test]
fn names_joined_along_different_paths_stay_distinct() {
    let table = table_for(CROSSING_DOC);
    let plans = partition(&table, &split_separators("x y"), "s").unwrap();
    assert_eq!(
        names(&plans),
        [
            "run_a_b_c_s.sh",
            "run_a_c_s.sh",
            "run_a_b_b_c_s.sh",
            "run_a_b_c_s_2.sh"
        ]
    );
    assert_eq!(plans[0].table.rows()[0].get("x"), Some("a"));
    assert_eq!(plans[3].table.rows()[0].get("x"), Some("a_b"));
    assert!(plans.iter().all(|plan| plan.table.len() == 1));
}

#[test]
fn unknown_separator_is_rejected() {
    let table = table_for(
        r#"{"batch_system": "local",
            "algorithms": [{"executable": "./bfs", "parameters_location": {"n": 1},
                "parameters_values": {"n": "1:2"}}]}"#,
    );
    let err = partition(&table, &split_separators("n graphs"), "s").unwrap_err();
    assert_eq!(err.code(), codes::INVALID_SEPARATOR);
    assert_eq!(
        err.info().context.get("separator").map(String::as_str),
        Some("graphs")
    );
}

#[test]
fn no_separator_yields_single_script() {
    let table = table_for(
        r#"{"batch_system": "local",
            "algorithms": [{"executable": "./bfs", "parameters_location": {"n": 1},
                "parameters_values": {"n": "1:2"}}]}"#,
    );
    let plans = partition(&table, &[], "script").unwrap();
    assert_eq!(names(&plans), ["run_script.sh"]);
    assert_eq!(plans[0].stem(), "run_script");
    assert_eq!(plans[0].table, table);
}

proptest! {
    #[test]
    fn every_row_lands_in_exactly_one_script(groups in proptest::collection::vec(0u8..6, 1..80)) {
        let mut table = InvocationTable::new();
        table.extend(
            groups
                .iter()
                .enumerate()
                .map(|(id, group)| InvocationRow {
                    algorithm: 0,
                    executable: "./exe".into(),
                    cells: vec![
                        ("graphs".into(), format!("g{group}.el")),
                        ("id".into(), id.to_string()),
                    ],
                })
                .collect(),
        );
        let plans = partition(&table, &split_separators("graphs id"), "p").unwrap();
        let mut file_names: Vec<&str> = names(&plans);
        file_names.sort_unstable();
        file_names.dedup();
        prop_assert_eq!(file_names.len(), plans.len());
        let mut ids: Vec<usize> = plans
            .iter()
            .flat_map(|plan| plan.table.rows().iter())
            .map(|row| row.get("id").unwrap().parse().unwrap())
            .collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..groups.len()).collect::<Vec<_>>());
        prop_assert_eq!(plans.len(), groups.len());
    }
}
