use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn dayplan_help_works() {
    Command::cargo_bin("dayplan")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("day-timeline task manager"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["add", "list", "edit", "rm", "ui"];

    for cmd in subcommands {
        Command::cargo_bin("dayplan")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}
