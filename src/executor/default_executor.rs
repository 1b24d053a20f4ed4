use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::{self, Read, Write};
use std::os::raw::c_char;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, pipe2, ForkResult, Pid};
use tracing::{debug, trace};

use super::executor::{DispatchOutcome, ExecError, ExecStatus, Executor};

/// Exit status of a child whose program could not be started.
const EXIT_NOT_STARTED: i32 = 127;

/// Length of the failure report a child writes before `_exit`: stage byte and
/// a little-endian errno.
const REPORT_LEN: usize = 5;

/// Owned argument vector in the layout `execv` expects: one pointer per
/// argument followed by a null sentinel.
pub struct ArgVector {
    args: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl ArgVector {
    pub fn new(argv: &[String]) -> Result<Self, ExecError> {
        if argv.is_empty() {
            return Err(ExecError::EmptyCommand);
        }
        let args = argv
            .iter()
            .map(|a| CString::new(a.as_bytes()).map_err(|_| ExecError::InvalidArgument(a.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        let ptrs = args
            .iter()
            .map(|a| a.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        Ok(ArgVector { args, ptrs })
    }

    /// Number of arguments, not counting the sentinel.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn program(&self) -> &CStr {
        &self.args[0]
    }

    /// Every slot including the trailing null.
    pub fn slots(&self) -> &[*const c_char] {
        &self.ptrs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Stage {
    Redirect = 1,
    Exec = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChildFailure {
    stage: Stage,
    errno: i32,
}

impl ChildFailure {
    fn encode(self) -> [u8; REPORT_LEN] {
        let mut buf = [0u8; REPORT_LEN];
        buf[0] = self.stage as u8;
        buf[1..].copy_from_slice(&self.errno.to_le_bytes());
        buf
    }

    fn decode(buf: &[u8]) -> io::Result<Option<Self>> {
        if buf.is_empty() {
            return Ok(None);
        }
        let bad = || io::Error::new(io::ErrorKind::InvalidData, "malformed child failure report");
        if buf.len() != REPORT_LEN {
            return Err(bad());
        }
        let stage = match buf[0] {
            1 => Stage::Redirect,
            2 => Stage::Exec,
            _ => return Err(bad()),
        };
        let mut errno = [0u8; 4];
        errno.copy_from_slice(&buf[1..]);
        Ok(Some(ChildFailure {
            stage,
            errno: i32::from_le_bytes(errno),
        }))
    }
}

/// Runs each command in a forked child that replaces itself with the target
/// program via `execv`. No search path is consulted.
pub struct DefaultExecutor;

impl Executor for DefaultExecutor {
    fn dispatch(&mut self, argv: &[String], stdout: Option<&Path>) -> ExecStatus {
        // Everything the child touches is allocated here, before the fork.
        let args = ArgVector::new(argv)?;
        let target = stdout
            .map(|p| {
                CString::new(p.as_os_str().as_bytes())
                    .map_err(|_| ExecError::InvalidArgument(p.display().to_string()))
            })
            .transpose()?;

        // Close-on-exec: a successful execv closes the write end, so the parent
        // reads EOF with nothing in it.
        let (report_rd, report_wr) = pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?;

        // The child is a copy of this process; unflushed output would be
        // written twice.
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();

        match unsafe { fork() }.map_err(ExecError::Fork)? {
            ForkResult::Child => unsafe {
                exec_child(&args, target.as_deref(), report_wr.as_raw_fd())
            },
            ForkResult::Parent { child } => {
                debug!(pid = child.as_raw(), program = %argv[0], "spawned child");
                drop(report_wr);
                let report = read_report(report_rd);
                let code = wait_for(child)?;
                debug!(pid = child.as_raw(), code, "child finished");

                match report? {
                    None => Ok(DispatchOutcome::Completed(code)),
                    Some(ChildFailure { stage: Stage::Exec, errno }) => {
                        debug!(program = %argv[0], errno, "execv failed");
                        Ok(DispatchOutcome::CommandNotFound(argv[0].clone()))
                    }
                    Some(ChildFailure { stage: Stage::Redirect, errno }) => Err(ExecError::Redirect {
                        path: stdout.map(Path::to_path_buf).unwrap_or_default(),
                        source: io::Error::from_raw_os_error(errno),
                    }),
                }
            }
        }
    }
}

/// Child side of the fork. Only async-signal-safe calls from here on; any
/// failure ends in `_exit`, which skips atexit handlers and stdio flushing.
unsafe fn exec_child(args: &ArgVector, stdout: Option<&CStr>, report: RawFd) -> ! {
    if let Some(path) = stdout {
        let fd = unsafe {
            libc::open(
                path.as_ptr(),
                libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
                0o644 as libc::c_uint,
            )
        };
        if fd < 0 {
            unsafe { fail(report, Stage::Redirect) }
        }
        if fd != libc::STDOUT_FILENO {
            if unsafe { libc::dup2(fd, libc::STDOUT_FILENO) } < 0 {
                unsafe { fail(report, Stage::Redirect) }
            }
            unsafe { libc::close(fd) };
        }
    }

    unsafe { libc::execv(args.program().as_ptr(), args.slots().as_ptr()) };
    unsafe { fail(report, Stage::Exec) }
}

unsafe fn fail(report: RawFd, stage: Stage) -> ! {
    let failure = ChildFailure {
        stage,
        errno: Errno::last() as i32,
    };
    let buf = failure.encode();
    unsafe {
        let _ = libc::write(report, buf.as_ptr().cast(), buf.len());
        libc::_exit(EXIT_NOT_STARTED)
    }
}

fn read_report(fd: std::os::fd::OwnedFd) -> io::Result<Option<ChildFailure>> {
    let mut buf = Vec::with_capacity(REPORT_LEN);
    File::from(fd).read_to_end(&mut buf)?;
    ChildFailure::decode(&buf)
}

fn wait_for(child: Pid) -> Result<i32, ExecError> {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(128 + signal as i32),
            Ok(status) => trace!(?status, "child not finished yet"),
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(ExecError::Wait {
                    pid: child.as_raw(),
                    source,
                });
            }
        }
    }
}
