//! End-to-end tests for the `school` demo binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn school() -> Command {
    cargo_bin_cmd!("school")
}

// ============================================
// Successful runs
// ============================================

mod runs {
    use super::*;

    #[test]
    fn lists_students() {
        school()
            .args(["students", "list"])
            .assert()
            .success()
            .stdout("Pat       3.2\nAl        4\nCam       2.8\n");
    }

    #[test]
    fn filters_by_min_gpa_with_single_dash_flag() {
        school()
            .args(["students", "list", "-min", "3"])
            .assert()
            .success()
            .stdout("Pat       3.2\nAl        4\n");
    }

    #[test]
    fn sorts_with_oneof_flag() {
        school()
            .args(["students", "list", "--sort=name"])
            .assert()
            .success()
            .stdout("Al        4\nCam       2.8\nPat       3.2\n");
    }

    #[test]
    fn shows_student_verbosely() {
        school()
            .args(["students", "show", "-v", "Pat"])
            .assert()
            .success()
            .stdout("Pat\nGPA: 3.2\n");
    }

    #[test]
    fn group_flag_runs_before_hook() {
        school()
            .args(["courses", "-upper", "show", "Math", "History"])
            .assert()
            .success()
            .stdout("MATH\nHISTORY\n");
    }

    #[test]
    fn help_exits_zero() {
        school()
            .args(["students", "show", "-h"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("Usage:\nschool students show [flags] NAME"))
            .stdout(predicate::str::contains("-v\tshow more detail"));
    }

    #[test]
    fn root_help_lists_every_command() {
        school()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("school students list [flags]"))
            .stdout(predicate::str::contains("school courses show NAMES..."));
    }
}

// ============================================
// Usage errors (exit 2)
// ============================================

mod usage_errors {
    use super::*;

    #[test]
    fn unknown_command_suggests() {
        school()
            .args(["students", "lsit"])
            .assert()
            .code(2)
            .stderr(predicate::str::starts_with(
                "students: unknown command \"lsit\"\nDid you mean \"list\"?\nUsage:\n",
            ));
    }

    #[test]
    fn missing_sub_command() {
        school()
            .arg("courses")
            .assert()
            .code(2)
            .stderr(predicate::str::starts_with("courses: missing sub-command"));
    }

    #[test]
    fn rest_minimum() {
        school()
            .args(["courses", "show"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains(
                "show: NAMES: need at least 1 argument, got 0",
            ));
    }

    #[test]
    fn oneof_violation() {
        school()
            .args(["students", "list", "--sort", "age"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("must be one of: name, gpa"));
    }

    #[test]
    fn behaviour_usage_error() {
        school()
            .args(["students", "list", "-min", "5"])
            .assert()
            .code(2)
            .stderr(predicate::str::starts_with(
                "list: min GPA out of range [0, 4]\nUsage:\nschool students list [flags]",
            ));
    }

    #[test]
    fn too_many_arguments() {
        school()
            .args(["students", "show", "Pat", "Al"])
            .assert()
            .code(2)
            .stderr(predicate::str::starts_with("show: too many arguments"));
    }
}

// ============================================
// Execution errors (exit 1)
// ============================================

mod execution_errors {
    use super::*;

    #[test]
    fn unknown_student() {
        school()
            .args(["students", "show", "Zed"])
            .assert()
            .code(1)
            .stderr("no student named \"Zed\"\n");
    }

    #[test]
    fn unknown_course() {
        school()
            .args(["courses", "show", "Math", "Art"])
            .assert()
            .code(1)
            .stdout("Math\n")
            .stderr("no course named \"Art\"\n");
    }
}

// ============================================
// Render configuration
// ============================================

mod render_config {
    use super::*;

    #[test]
    fn narrow_line_width_wraps_header() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("render.toml");
        std::fs::write(&path, "line_width = 10\n").expect("write config");

        school()
            .env("SCHOOL_RENDER_CONFIG", &path)
            .args(["courses", "list", "-help"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "Usage:\nschool courses list\n  list courses\n",
            ));
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("render.toml");
        std::fs::write(&path, "line_width = [").expect("write config");

        school()
            .env("SCHOOL_RENDER_CONFIG", &path)
            .args(["courses", "list", "-help"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(
                "Usage:\nschool courses list    list courses\n",
            ))
            .stderr(predicate::str::contains("failed to parse render config"));
    }
}
