use std::io::{self, BufRead, Write};

use toylib::pipeline::{PipelineError, Session};
use toylib::vm::{BuiltinHost, VmError, VmErrorKind};

const PROMPT: &str = ">> ";

/// Routes builtin output into the REPL's writer so it interleaves with
/// results.
struct WriterHost<'a, W: Write> {
    out: &'a mut W,
}

impl<W: Write> BuiltinHost for WriterHost<'_, W> {
    fn write(&mut self, s: &str, newline: bool) -> Result<(), VmError> {
        let res = if newline {
            writeln!(self.out, "{s}")
        } else {
            write!(self.out, "{s}")
        };
        res.map_err(|e| VmError {
            kind: VmErrorKind::HostError,
            message: e.to_string(),
        })
    }
}

/// Line-at-a-time loop. Globals persist across lines; `exit` or `quit`
/// ends the session, as does end of input.
pub fn start<R: BufRead, W: Write>(input: R, out: &mut W) -> io::Result<()> {
    let mut session = Session::new();
    let mut lines = input.lines();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            return Ok(());
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            writeln!(out, "Goodbye!")?;
            return Ok(());
        }

        let outcome = {
            let mut host = WriterHost { out: &mut *out };
            session.eval(trimmed, &mut host)
        };
        match outcome {
            Ok(value) => writeln!(out, "{value}")?,
            Err(PipelineError::Parse(diags)) => {
                writeln!(out, "Parser errors:")?;
                for d in diags.iter() {
                    writeln!(out, "\t{}", d.message)?;
                }
            }
            Err(e) => {
                log::debug!("repl input failed: {e:?}");
                writeln!(out, "{e}")?;
            }
        }
    }
}
