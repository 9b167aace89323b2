use std::io::{self, Write};

use super::{BuiltinHost, VmError, VmErrorKind};

#[derive(Debug, Default)]
pub struct StdIoHost;

impl BuiltinHost for StdIoHost {
    fn write(&mut self, s: &str, newline: bool) -> Result<(), VmError> {
        let mut out = io::stdout().lock();
        let res = if newline {
            writeln!(out, "{s}")
        } else {
            write!(out, "{s}").and_then(|_| out.flush())
        };
        res.map_err(|e| VmError::new(VmErrorKind::HostError, e.to_string()))
    }
}

/// Captures builtin output in memory.
#[derive(Debug, Default)]
pub struct TestHost {
    pub output: String,
}

impl BuiltinHost for TestHost {
    fn write(&mut self, s: &str, newline: bool) -> Result<(), VmError> {
        self.output.push_str(s);
        if newline {
            self.output.push('\n');
        }
        Ok(())
    }
}
