//! Running a command tree against an argument vector.
//!
//! Each level parses its own flags, runs its `before` hook, then either
//! hands the remaining arguments to a matching sub-command or binds them to
//! its positional formals and runs.

use strsim::levenshtein;
use tracing::{debug, trace};

use crate::command::{CommandTree, FlagError, Formal, NodeId};
use crate::error::{Error, RegistrationError, UsageError};
use crate::record::Behavior;
use crate::value::Value;

impl<C: 'static> CommandTree<C> {
    /// Run the tree on `args`, which excludes the program name.
    pub fn run(&mut self, ctx: &C, args: &[String]) -> Result<(), Error> {
        self.run_node(NodeId::ROOT, ctx, args)
    }

    fn run_node(&mut self, id: NodeId, ctx: &C, args: &[String]) -> Result<(), Error> {
        match self.dispatch(id, ctx, args) {
            Err(Error::Usage(err)) if err.command().is_none() => {
                let name = self.node(id).name().to_string();
                Err(Error::Usage(err.attach(name, self.help_text(id))))
            }
            other => other,
        }
    }

    fn dispatch(&mut self, id: NodeId, ctx: &C, args: &[String]) -> Result<(), Error> {
        self.validate(id)?;
        let parsed = match self.node(id).flags().parse(self.node(id).name(), args) {
            Ok(parsed) => parsed,
            Err(FlagError::Help) => {
                return Err(Error::Help {
                    usage: self.help_text(id),
                });
            }
            Err(FlagError::Invalid(message)) => return Err(UsageError::new(message).into()),
        };

        let behavior = &mut self.nodes[id.0].behavior;
        assign(behavior, parsed.values)?;
        behavior.before(ctx).map_err(Error::from_behavior)?;

        let operands = parsed.operands;
        if let Some(first) = operands.first() {
            if let Some(child) = self.find_child(id, first) {
                debug!(command = %self.path(child), args = operands.len() - 1, "delegating");
                return self.run_node(child, ctx, &operands[1..]);
            }
            let node = self.node(id);
            if !node.children().is_empty() && node.formals().is_empty() {
                let mut err = UsageError::new(format!("unknown command {first:?}"));
                if let Some(suggestion) = self.suggest_child(id, first) {
                    err = err.with_suggestion(suggestion);
                }
                return Err(err.into());
            }
        }

        let bound = bind_formals(self.node(id).formals(), &operands)?;
        debug!(command = %self.path(id), args = operands.len(), "binding");
        let behavior = &mut self.nodes[id.0].behavior;
        assign(behavior, bound)?;
        match behavior {
            Behavior::Runnable(record) => record.run(ctx).map_err(Error::from_behavior),
            Behavior::Group(_) | Behavior::None => Err(UsageError::new("missing sub-command").into()),
        }
    }

    /// Closest child name within edit distance 2.
    fn suggest_child(&self, id: NodeId, input: &str) -> Option<String> {
        self.node(id)
            .children()
            .iter()
            .map(|child| self.node(*child).name())
            .map(|name| (name, levenshtein(input, name)))
            .filter(|(_, distance)| *distance <= 2)
            .min_by_key(|(_, distance)| *distance)
            .map(|(name, _)| name.to_string())
    }
}

fn assign<C: 'static>(
    behavior: &mut Behavior<C>,
    values: Vec<(&'static str, Value)>,
) -> Result<(), RegistrationError> {
    for (field, value) in values {
        trace!(field, %value, "assign");
        behavior
            .set(field, value)
            .map_err(|source| RegistrationError::Assign {
                field: field.to_string(),
                source,
            })?;
    }
    Ok(())
}

/// Match positional arguments to formals.
///
/// Returns the coerced value for each formal that received input, in formal
/// order. Once an optional formal runs out of arguments, it and every later
/// formal keep their current values, except that a trailing rest formal
/// still needs its minimum.
pub(crate) fn bind_formals(
    formals: &[Formal],
    args: &[String],
) -> Result<Vec<(&'static str, Value)>, UsageError> {
    let mut bound = Vec::with_capacity(formals.len());
    let mut a = 0;
    for formal in formals {
        if formal.is_rest() {
            check_min(formal, args.len() - a)?;
            let values = args[a..]
                .iter()
                .map(|arg| parse_arg(formal, arg))
                .collect::<Result<Vec<_>, _>>()?;
            bound.push((formal.field, Value::List(values)));
            return Ok(bound);
        }
        let Some(arg) = args.get(a) else {
            if formal.is_optional() {
                if let Some(rest) = formals.last().filter(|f| f.is_rest()) {
                    check_min(rest, 0)?;
                }
                return Ok(bound);
            }
            return Err(UsageError::new("too few arguments"));
        };
        bound.push((formal.field, parse_arg(formal, arg)?));
        a += 1;
    }
    if a < args.len() {
        return Err(UsageError::new("too many arguments"));
    }
    Ok(bound)
}

fn check_min(formal: &Formal, got: usize) -> Result<(), UsageError> {
    if got >= formal.min() {
        return Ok(());
    }
    let noun = if formal.min() == 1 {
        "argument"
    } else {
        "arguments"
    };
    Err(UsageError::new(format!(
        "{}: need at least {} {noun}, got {got}",
        formal.name(),
        formal.min()
    )))
}

fn parse_arg(formal: &Formal, arg: &str) -> Result<Value, UsageError> {
    formal
        .parser
        .parse(arg)
        .map_err(|err| UsageError::new(format!("{}: {err}", formal.name())))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::coerce::build_parser;
    use crate::record::{Group, Runnable};
    use crate::tag::Tag;
    use crate::value::Kind;

    fn formal(field: &'static str, optional: bool) -> Formal {
        Formal {
            name: field.to_uppercase(),
            field,
            doc: String::new(),
            optional,
            rest: false,
            min: 0,
            parser: build_parser(&Kind::Str, &Tag::default(), false).unwrap(),
        }
    }

    fn req(field: &'static str) -> Formal {
        formal(field, false)
    }

    fn opt(field: &'static str) -> Formal {
        formal(field, true)
    }

    fn rest(min: usize) -> Formal {
        Formal {
            name: "r".to_string(),
            rest: true,
            min,
            ..formal("r", false)
        }
    }

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    fn list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|i| s(i)).collect())
    }

    #[test]
    fn test_bind_formals() {
        type Want = Result<Vec<(&'static str, Value)>, &'static str>;
        let cases: Vec<(&str, Vec<Formal>, Vec<&str>, Want)> = vec![
            ("empty", vec![], vec![], Ok(vec![])),
            (
                "required",
                vec![req("f1"), req("f2")],
                vec!["a", "b"],
                Ok(vec![("f1", s("a")), ("f2", s("b"))]),
            ),
            ("required too few", vec![req("f1"), req("f2")], vec!["a"], Err("too few")),
            ("required too many", vec![req("f1")], vec!["a", "b"], Err("too many")),
            (
                "two required too many",
                vec![req("f1"), req("f2")],
                vec!["a", "b", "c"],
                Err("too many"),
            ),
            (
                "min 0 none",
                vec![req("f1"), rest(0)],
                vec!["a"],
                Ok(vec![("f1", s("a")), ("r", list(&[]))]),
            ),
            (
                "min 0 two",
                vec![req("f1"), rest(0)],
                vec!["a", "b", "c"],
                Ok(vec![("f1", s("a")), ("r", list(&["b", "c"]))]),
            ),
            ("min 1 none", vec![req("f1"), rest(1)], vec!["a"], Err("at least 1")),
            (
                "min 1 one",
                vec![req("f1"), rest(1)],
                vec!["a", "b"],
                Ok(vec![("f1", s("a")), ("r", list(&["b"]))]),
            ),
            (
                "opt absent",
                vec![req("f1"), opt("f2"), opt("f3")],
                vec!["a"],
                Ok(vec![("f1", s("a"))]),
            ),
            (
                "opt present",
                vec![req("f1"), opt("f2"), opt("f3")],
                vec!["a", "b", "c"],
                Ok(vec![("f1", s("a")), ("f2", s("b")), ("f3", s("c"))]),
            ),
            (
                "opt some",
                vec![req("f1"), opt("f2"), opt("f3")],
                vec!["a", "b"],
                Ok(vec![("f1", s("a")), ("f2", s("b"))]),
            ),
            (
                "opt rest",
                vec![req("f1"), opt("f2"), rest(1)],
                vec!["fall"],
                Err("at least 1"),
            ),
            (
                "opt rest 2",
                vec![req("f1"), opt("f2"), rest(1)],
                vec!["fall", "term"],
                Err("at least 1"),
            ),
            (
                "opt rest 3",
                vec![req("f1"), opt("f2"), rest(1)],
                vec!["fall", "term", "p1"],
                Ok(vec![("f1", s("fall")), ("f2", s("term")), ("r", list(&["p1"]))]),
            ),
            (
                "opt rest 4",
                vec![req("f1"), opt("f2"), rest(1)],
                vec!["fall", "term", "p1", "p2"],
                Ok(vec![
                    ("f1", s("fall")),
                    ("f2", s("term")),
                    ("r", list(&["p1", "p2"])),
                ]),
            ),
        ];
        for (name, formals, args, want) in cases {
            let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            match (bind_formals(&formals, &args), want) {
                (Ok(got), Ok(want)) => assert_eq!(got, want, "{name}"),
                (Err(got), Err(want)) => {
                    assert!(got.to_string().contains(want), "{name}: got {got}, want {want:?}")
                }
                (got, want) => panic!("{name}: got {got:?}, want {want:?}"),
            }
        }
    }

    #[test]
    fn test_rest_minimum_message_is_pluralized() {
        let args = vec!["a".to_string()];
        let err = bind_formals(&[req("f1"), rest(2)], &args).unwrap_err();
        assert_eq!(err.to_string(), "r: need at least 2 arguments, got 0");
        let err = bind_formals(&[rest(1)], &[]).unwrap_err();
        assert_eq!(err.to_string(), "r: need at least 1 argument, got 0");
    }

    #[test]
    fn test_positional_parse_error_names_formal() {
        let mut number = req("n");
        number.parser = build_parser(&Kind::Int(32), &Tag::default(), false).unwrap();
        let err = bind_formals(&[number], &["x".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "N: invalid digit found in string");
    }

    type Log = RefCell<Vec<String>>;

    crate::record! {
        #[derive(Default)]
        struct Students {
            #[arg("flag=, louder output")]
            verbose: bool,
        }
    }

    impl Group<Log> for Students {
        fn before(&mut self, ctx: &Log) -> anyhow::Result<()> {
            ctx.borrow_mut().push(format!("before verbose={}", self.verbose));
            Ok(())
        }
    }

    crate::record! {
        #[derive(Default)]
        struct Show {
            #[arg("flag=n, how many")]
            n: u32,
            #[arg]
            id: String,
            #[arg("opt=")]
            extra: String,
        }
    }

    impl Runnable<Log> for Show {
        fn run(&mut self, ctx: &Log) -> anyhow::Result<()> {
            ctx.borrow_mut()
                .push(format!("show n={} id={} extra={}", self.n, self.id, self.extra));
            Ok(())
        }
    }

    crate::record! {
        #[derive(Default)]
        struct Fail {
            #[arg]
            what: String,
        }
    }

    impl Runnable<Log> for Fail {
        fn run(&mut self, _ctx: &Log) -> anyhow::Result<()> {
            match self.what.as_str() {
                "usage" => Err(UsageError::new("bad what").into()),
                _ => Err(anyhow::anyhow!("boom")),
            }
        }
    }

    fn tree() -> (CommandTree<Log>, NodeId) {
        let mut tree = CommandTree::new("prog");
        let students = tree
            .group_with(tree.root(), "students", Students::default(), "students")
            .unwrap();
        let show = tree
            .command(students, "show", Show::default(), "show one")
            .unwrap();
        tree.command(tree.root(), "fail", Fail::default(), "fail")
            .unwrap();
        (tree, show)
    }

    fn run(tree: &mut CommandTree<Log>, args: &[&str]) -> (Result<(), Error>, Vec<String>) {
        let log = Log::default();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let result = tree.run(&log, &args);
        (result, log.into_inner())
    }

    fn usage_err(result: Result<(), Error>) -> UsageError {
        match result {
            Err(Error::Usage(err)) => err,
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_run_delegates_and_binds() {
        let (mut tree, show) = tree();
        let (result, log) = run(&mut tree, &["students", "--verbose", "show", "-n", "3", "42"]);
        result.unwrap();
        assert_eq!(log, ["before verbose=true", "show n=3 id=42 extra="]);
        let record = tree.behavior::<Show>(show).unwrap();
        assert_eq!(record.n, 3);
        assert_eq!(record.id, "42");
    }

    #[test]
    fn test_run_unknown_command_suggests() {
        let (mut tree, _) = tree();
        let err = usage_err(run(&mut tree, &["students", "shwo"]).0);
        assert_eq!(err.to_string(), "students: unknown command \"shwo\"");
        assert_eq!(err.suggestion(), Some("show"));
        assert!(err.usage().unwrap().contains("prog students show"));
    }

    #[test]
    fn test_run_group_without_subcommand() {
        let (mut tree, _) = tree();
        let (result, log) = run(&mut tree, &["students"]);
        assert_eq!(usage_err(result).to_string(), "students: missing sub-command");
        assert_eq!(log, ["before verbose=false"]);
    }

    #[test]
    fn test_run_arity_errors_attach_innermost_command() {
        let (mut tree, _) = tree();
        let err = usage_err(run(&mut tree, &["students", "show"]).0);
        assert_eq!(err.to_string(), "show: too few arguments");
        let err = usage_err(run(&mut tree, &["students", "show", "a", "b", "c"]).0);
        assert_eq!(err.to_string(), "show: too many arguments");
    }

    #[test]
    fn test_run_bad_flag_value_is_usage_error() {
        let (mut tree, _) = tree();
        let err = usage_err(run(&mut tree, &["students", "show", "-n", "x", "1"]).0);
        assert!(err.message().starts_with("invalid value \"x\" for flag -n"), "{err}");
        assert_eq!(err.command(), Some("show"));
    }

    #[test]
    fn test_run_help() {
        let (mut tree, _) = tree();
        match run(&mut tree, &["students", "show", "--help"]).0 {
            Err(Error::Help { usage }) => assert!(usage.starts_with("prog students show"), "{usage}"),
            other => panic!("expected help, got {other:?}"),
        }
    }

    #[test]
    fn test_run_behavior_errors() {
        let (mut tree, _) = tree();
        let err = usage_err(run(&mut tree, &["fail", "usage"]).0);
        assert_eq!(err.to_string(), "fail: bad what");
        assert!(err.usage().unwrap().starts_with("prog fail WHAT"));

        let (result, _) = run(&mut tree, &["fail", "other"]);
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Execution(_)));
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_run_empty_group_is_invalid() {
        let mut tree: CommandTree<Log> = CommandTree::new("prog");
        tree.group(tree.root(), "empty", "").unwrap();
        let (result, _) = run(&mut tree, &["empty"]);
        assert!(matches!(result, Err(Error::Invalid(RegistrationError::EmptyGroup(_)))));
    }
}
