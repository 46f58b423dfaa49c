//! Process-level glue: run a tree on the program arguments, print what went
//! wrong, and map the outcome onto an exit code.

use std::io::{self, Write};
use std::process::ExitCode;

use crate::command::CommandTree;
use crate::error::{EXIT_FAILURE, EXIT_SUCCESS, Error};

impl<C: 'static> CommandTree<C> {
    /// Run on `std::env::args()`. Help goes to stdout, errors to stderr.
    pub fn main(&mut self, ctx: &C) -> ExitCode {
        // args[0] is the program itself; the root node stands for it.
        let args: Vec<String> = std::env::args().skip(1).collect();
        let code = self.main_with_args(ctx, &args, &mut io::stdout(), &mut io::stderr());
        ExitCode::from(u8::try_from(code).unwrap_or(1))
    }

    /// Run on `args` and return the exit code: 0 for success or help, 1 for
    /// a failed command or a broken declaration, 2 for a usage error.
    pub fn main_with_args(
        &mut self,
        ctx: &C,
        args: &[String],
        stdout: &mut impl Write,
        stderr: &mut impl Write,
    ) -> i32 {
        if let Err(err) = self.validate_all() {
            writeln!(stderr, "{err}").ok();
            return EXIT_FAILURE;
        }
        match self.run(ctx, args) {
            Ok(()) => EXIT_SUCCESS,
            Err(err) => {
                report(&err, stdout, stderr).ok();
                err.exit_code()
            }
        }
    }
}

fn report(err: &Error, stdout: &mut impl Write, stderr: &mut impl Write) -> io::Result<()> {
    match err {
        Error::Help { usage } => write!(stdout, "Usage:\n{usage}"),
        Error::Usage(usage) => write!(stderr, "{}", usage.render()),
        Error::Invalid(_) | Error::Execution(_) => writeln!(stderr, "{err:#}"),
    }
}
