//! Privilege-dropping helper for the embedded PostgreSQL test cluster.
//!
//! When the integration suites run as root, `pg_embedded_setup_unpriv`
//! re-executes each lifecycle step through this binary as an unprivileged
//! user. It is invoked as `pg_worker <setup|start|stop> <payload.json>`; the
//! payload is a serialised [`WorkerPayload`].

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use color_eyre::eyre::{Context, Report, Result, bail, eyre};
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let invocation = Invocation::from_args(env::args_os())?;
    let payload = read_payload(&invocation.payload_path)?;
    invocation.step.run(payload)
}

/// Lifecycle step requested by the bootstrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

impl FromStr for Step {
    type Err = Report;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!("unknown pg_worker step '{other}'; expected setup, start or stop")),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

impl Step {
    fn run(self, payload: WorkerPayload) -> Result<()> {
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| Report::new(err).wrap_err("rebuilding postgres settings"))?;
        export_environment(payload.environment);

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .wrap_err("building pg_worker runtime")?;
        let mut postgres = PostgreSQL::new(settings);
        runtime
            .block_on(async move {
                match self {
                    Self::Setup => postgres.setup().await,
                    Self::Start => postgres.start().await,
                    Self::Stop => postgres.stop().await,
                }
            })
            .with_context(|| format!("postgres {self} failed"))
    }
}

/// Parsed command line.
#[derive(Debug)]
struct Invocation {
    step: Step,
    payload_path: PathBuf,
}

impl Invocation {
    fn from_args(mut args: impl Iterator<Item = OsString>) -> Result<Self> {
        let _program = args.next();
        let step = args
            .next()
            .ok_or_else(|| eyre!("missing step argument"))?
            .to_string_lossy()
            .parse()?;
        let payload_path = args
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| eyre!("missing payload path argument"))?;
        if let Some(extra) = args.next() {
            bail!("unexpected extra argument: {}", extra.to_string_lossy());
        }
        Ok(Self { step, payload_path })
    }
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = fs::read(path).with_context(|| format!("reading worker payload {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("parsing worker payload {}", path.display()))
}

fn export_environment(environment: Vec<(String, Option<PlainSecret>)>) {
    for (key, value) in environment {
        // SAFETY: runs before the runtime is built, while the process is
        // still single-threaded.
        match value {
            Some(value) => unsafe { env::set_var(&key, value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(values: &[&str]) -> impl Iterator<Item = OsString> {
        values
            .iter()
            .map(OsString::from)
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[rstest]
    #[case("setup", Step::Setup)]
    #[case("start", Step::Start)]
    #[case("stop", Step::Stop)]
    fn parses_each_step(#[case] raw: &str, #[case] expected: Step) {
        let invocation =
            Invocation::from_args(args(&["pg_worker", raw, "/tmp/payload.json"])).expect("valid args");
        assert_eq!(invocation.step, expected);
        assert_eq!(invocation.payload_path, PathBuf::from("/tmp/payload.json"));
    }

    #[rstest]
    fn unknown_step_is_rejected() {
        let err = Invocation::from_args(args(&["pg_worker", "noop", "/tmp/payload.json"]))
            .expect_err("unknown step");
        assert!(err.to_string().contains("unknown pg_worker step"));
    }

    #[rstest]
    fn missing_payload_path_is_rejected() {
        let err = Invocation::from_args(args(&["pg_worker", "start"])).expect_err("missing path");
        assert!(err.to_string().contains("missing payload path"));
    }

    #[rstest]
    fn extra_argument_is_rejected() {
        let err = Invocation::from_args(args(&["pg_worker", "stop", "/tmp/payload.json", "extra"]))
            .expect_err("extra argument");
        assert!(err.to_string().contains("unexpected extra argument"));
    }
}
