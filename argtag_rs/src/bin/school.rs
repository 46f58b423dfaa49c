//! `school` - a small demo program built on argtag.
//!
//! ```bash
//! school students list -min 3
//! school students show -v Pat
//! school courses -upper show Math History
//! ```

use std::cell::Cell;
use std::path::Path;
use std::process::ExitCode;

use argtag::{CommandTree, Group, RegistrationError, RenderConfig, Runnable, UsageError};

struct Student {
    name: &'static str,
    gpa: f64,
}

/// Shared state handed to every command.
struct School {
    students: Vec<Student>,
    courses: Vec<&'static str>,
    upper: Cell<bool>,
}

impl School {
    fn new() -> Self {
        Self {
            students: vec![
                Student { name: "Pat", gpa: 3.2 },
                Student { name: "Al", gpa: 4.0 },
                Student { name: "Cam", gpa: 2.8 },
            ],
            courses: vec!["Math", "Science", "History"],
            upper: Cell::new(false),
        }
    }
}

argtag::record! {
    #[derive(Default)]
    struct StudentsList {
        #[arg("flag=min, list only students above this GPA")]
        min_gpa: f64,
        #[arg("flag=, oneof=name|gpa, sort order")]
        sort: String,
    }
}

impl Runnable<School> for StudentsList {
    fn run(&mut self, school: &School) -> anyhow::Result<()> {
        if !(0.0..=4.0).contains(&self.min_gpa) {
            return Err(UsageError::new("min GPA out of range [0, 4]").into());
        }
        let mut rows: Vec<&Student> = school
            .students
            .iter()
            .filter(|s| self.min_gpa == 0.0 || s.gpa >= self.min_gpa)
            .collect();
        match self.sort.as_str() {
            "name" => rows.sort_by(|a, b| a.name.cmp(b.name)),
            "gpa" => rows.sort_by(|a, b| b.gpa.total_cmp(&a.gpa)),
            _ => {}
        }
        for s in rows {
            println!("{:<8}  {}", s.name, s.gpa);
        }
        Ok(())
    }
}

argtag::record! {
    #[derive(Default)]
    struct StudentsShow {
        #[arg("flag=v, show more detail")]
        verbose: bool,
        #[arg("student name")]
        name: String,
    }
}

impl Runnable<School> for StudentsShow {
    fn run(&mut self, school: &School) -> anyhow::Result<()> {
        let student = school
            .students
            .iter()
            .find(|s| s.name == self.name)
            .ok_or_else(|| anyhow::anyhow!("no student named {:?}", self.name))?;
        println!("{}", student.name);
        if self.verbose {
            println!("GPA: {}", student.gpa);
        }
        Ok(())
    }
}

argtag::record! {
    #[derive(Default)]
    struct CoursesGroup {
        #[arg("flag=, print course names in upper case")]
        upper: bool,
    }
}

impl Group<School> for CoursesGroup {
    fn before(&mut self, school: &School) -> anyhow::Result<()> {
        school.upper.set(self.upper);
        Ok(())
    }
}

fn course_name(school: &School, name: &str) -> String {
    if school.upper.get() {
        name.to_uppercase()
    } else {
        name.to_string()
    }
}

argtag::record! {
    #[derive(Default)]
    struct CoursesList {}
}

impl Runnable<School> for CoursesList {
    fn run(&mut self, school: &School) -> anyhow::Result<()> {
        for course in &school.courses {
            println!("{}", course_name(school, course));
        }
        Ok(())
    }
}

argtag::record! {
    #[derive(Default)]
    struct CoursesShow {
        #[arg("min=1, course names")]
        names: Vec<String>,
    }
}

impl Runnable<School> for CoursesShow {
    fn run(&mut self, school: &School) -> anyhow::Result<()> {
        for name in &self.names {
            let course = school
                .courses
                .iter()
                .copied()
                .find(|c| *c == name.as_str())
                .ok_or_else(|| anyhow::anyhow!("no course named {name:?}"))?;
            println!("{}", course_name(school, course));
        }
        Ok(())
    }
}

fn build() -> Result<CommandTree<School>, RegistrationError> {
    let mut tree = CommandTree::new("school");
    let root = tree.root();

    let students = tree.group(root, "students", "commands for students")?;
    tree.command(students, "list", StudentsList::default(), "list students")?;
    tree.command(students, "show", StudentsShow::default(), "show a single student")?;

    let courses = tree.group_with(root, "courses", CoursesGroup::default(), "commands for courses")?;
    tree.command(courses, "list", CoursesList::default(), "list courses")?;
    tree.command(courses, "show", CoursesShow::default(), "show some courses")?;

    Ok(tree)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut tree = match build() {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if let Ok(path) = std::env::var("SCHOOL_RENDER_CONFIG") {
        tree.set_render_config(RenderConfig::load_from_path(Path::new(&path)));
    }
    tree.main(&School::new())
}
