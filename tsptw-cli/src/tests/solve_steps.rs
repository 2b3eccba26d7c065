//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{TRIANGLE, Workspace};
use super::*;
use crate::solve::run_solve;
use camino::Utf8PathBuf;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

#[derive(Debug)]
struct SolveWorld {
    workspace: Workspace,
    instance_path: Utf8PathBuf,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        let workspace = Workspace::new();
        let instance_path = workspace.path("tri.txt");
        Self {
            workspace,
            instance_path,
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec![
            "tsptw".to_owned(),
            "solve".to_owned(),
            "-f".to_owned(),
            self.instance_path.as_str().to_owned(),
            "-t".to_owned(),
            "1".to_owned(),
        ];
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn stdout(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8")
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

#[given("a triangle instance file exists")]
fn triangle_exists(#[from(world)] world: &SolveWorld) {
    let written = world.workspace.write("tri.txt", TRIANGLE);
    assert_eq!(written, world.instance_path);
}

#[given("I pass the seed tour 1 2 with cost 3")]
fn pass_seed_with_cost(#[from(world)] world: &SolveWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend(["-s", "1 2", "-c", "3"].map(str::to_owned));
}

#[given("I pass the seed tour 1 2 without a cost")]
fn pass_seed_without_cost(#[from(world)] world: &SolveWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend(["-s", "1 2"].map(str::to_owned));
}

#[given("I ask for JSON output")]
fn ask_for_json(#[from(world)] world: &SolveWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_FORMAT}"), "json".to_owned()]);
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Solve(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_solve(args, &mut *buffer).map(|_| ())
        }
        Command::Check(_) | Command::Find(_) => panic!("expected solve command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds")]
fn command_succeeds(#[from(world)] world: &SolveWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    if let Err(err) = result {
        panic!("expected success, found {err:?}");
    }
}

#[then("the report line shows the initial tour closed at 3.00")]
fn report_closed_initial(#[from(world)] world: &SolveWorld) {
    let stdout = world.stdout();
    assert!(
        stdout.contains("/tri.txt |     cp-lns | closed (initial) |       3.00 |"),
        "unexpected line: {stdout}"
    );
    assert!(stdout.ends_with(" | 1 2\n"), "unexpected line: {stdout}");
}

#[then("the report line shows a crash opening the instance")]
fn report_crashed(#[from(world)] world: &SolveWorld) {
    let stdout = world.stdout();
    assert!(stdout.contains("|    crashed |       3.00 |"), "unexpected line: {stdout}");
    assert!(stdout.contains("failed to open instance"), "unexpected line: {stdout}");
}

#[then("the command fails because the cost is missing")]
fn command_fails_missing_cost(#[from(world)] world: &SolveWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_COST);
            assert_eq!(*env, ENV_SOLVE_COST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
    assert!(world.stdout.borrow().is_empty());
}

#[then("the JSON report shows the initial tour closed")]
fn json_report_closed(#[from(world)] world: &SolveWorld) {
    let report: serde_json::Value =
        serde_json::from_str(&world.stdout()).expect("output should be a JSON report");
    let instance = report["instance"].as_str().expect("instance name");
    assert!(instance.ends_with("/tri.txt"), "unexpected instance {instance}");
    assert_eq!(report["solver"], "cp-lns");
    assert_eq!(report["status"], "closed (initial)");
    assert_eq!(report["tour"], serde_json::json!([1, 2]));
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_triangle, "solving a triangle instance");
register_solve_scenario!(solve_missing_instance, "reporting a missing instance file");
register_solve_scenario!(solve_missing_cost, "rejecting a missing initial cost");
register_solve_scenario!(solve_json_report, "printing the report as JSON");
