//! Batch-system specific script dialects.

use std::io;

use jsg_config::{BatchSystem, Directives};
use jsg_space::{InvocationRow, InvocationTable};
use tracing::warn;

use crate::writer::ScriptWriter;

/// Column holding the per-invocation thread count.
pub const THREADS_COLUMN: &str = "threads";

/// Per-file values an emitter needs for its header and trailer.
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext<'a> {
    /// Script file name without the `.sh` extension.
    pub stem: &'a str,
    /// CPUs to request for the whole file.
    pub ncpus: u64,
    /// User directives for the batch system, in configuration order.
    pub directives: &'a Directives,
    /// Directory receiving stdout logs, relative to the master script.
    pub output_dir: &'a str,
    /// Directory receiving stderr logs, relative to the master script.
    pub error_dir: &'a str,
}

/// Writes one batch-system dialect.
///
/// Every variant spells out every method; there is no shared fallback
/// behaviour between dialects.
pub trait ScriptEmitter: Sync {
    /// Batch system this emitter targets.
    fn batch_system(&self) -> BatchSystem;

    /// Interpreter written on the shebang line.
    fn interpreter(&self) -> &'static str;

    /// Writes one scheduler directive.
    fn write_directive(&self, out: &mut ScriptWriter<'_>, key: &str, value: &str)
        -> io::Result<()>;

    /// Writes everything preceding the first task.
    fn begin(&self, out: &mut ScriptWriter<'_>, ctx: &ScriptContext<'_>) -> io::Result<()>;

    /// Writes the command for one invocation.
    fn write_task(&self, out: &mut ScriptWriter<'_>, line: &str, row: &InvocationRow)
        -> io::Result<()>;

    /// Writes everything following the last task.
    fn finish(&self, out: &mut ScriptWriter<'_>, ctx: &ScriptContext<'_>) -> io::Result<()>;

    /// Writes the master-script line that submits or runs `script`.
    fn write_job(&self, out: &mut ScriptWriter<'_>, script: &str) -> io::Result<()>;
}

/// Slurm `sbatch` scripts with an `srun` retry wrapper per task.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlurmEmitter;

/// LSF `bsub` scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsfEmitter;

/// Plain scripts run in sequence on the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEmitter;

/// Returns the emitter for `system`.
pub fn emitter_for(system: BatchSystem) -> &'static dyn ScriptEmitter {
    match system {
        BatchSystem::Slurm => &SlurmEmitter,
        BatchSystem::Lsf => &LsfEmitter,
        BatchSystem::Local => &LocalEmitter,
    }
}

const RETRY_HELPER: [&str; 7] = [
    "function p() {",
    "    rt=$?;",
    "    if [[ ${rt} -ne 0 ]]; then",
    "        sleep 2",
    "    fi",
    "    return ${rt}",
    "}",
];

impl ScriptEmitter for SlurmEmitter {
    fn batch_system(&self) -> BatchSystem {
        BatchSystem::Slurm
    }

    fn interpreter(&self) -> &'static str {
        "/bin/bash -l"
    }

    fn write_directive(
        &self,
        out: &mut ScriptWriter<'_>,
        key: &str,
        value: &str,
    ) -> io::Result<()> {
        out.write_line(&format!("#SBATCH --{key}={value}"))
    }

    fn begin(&self, out: &mut ScriptWriter<'_>, ctx: &ScriptContext<'_>) -> io::Result<()> {
        out.shebang(self.interpreter())?;
        for (key, value) in ctx.directives.iter() {
            self.write_directive(out, key, value)?;
        }
        // OpenMP only: one node, one task, all CPUs to that task.
        self.write_directive(out, "nodes", "1")?;
        self.write_directive(out, "ntasks", "1")?;
        self.write_directive(out, "cpus-per-task", &ctx.ncpus.to_string())?;
        self.write_directive(out, "error", &format!("{}/{}-%j.err", ctx.error_dir, ctx.stem))?;
        self.write_directive(out, "output", &format!("{}/{}-%j.out", ctx.output_dir, ctx.stem))?;
        out.write_line("export OMP_NUM_THREADS=$SLURM_CPUS_PER_TASK")?;
        for line in RETRY_HELPER {
            out.write_line(line)?;
        }
        Ok(())
    }

    fn write_task(
        &self,
        out: &mut ScriptWriter<'_>,
        line: &str,
        row: &InvocationRow,
    ) -> io::Result<()> {
        let threads = row.get(THREADS_COLUMN).unwrap_or("1");
        out.write_line(&format!("srun -c {threads} {line} ; p"))
    }

    fn finish(&self, _out: &mut ScriptWriter<'_>, _ctx: &ScriptContext<'_>) -> io::Result<()> {
        Ok(())
    }

    fn write_job(&self, out: &mut ScriptWriter<'_>, script: &str) -> io::Result<()> {
        out.write_line(&format!("sbatch {script}"))
    }
}

impl ScriptEmitter for LsfEmitter {
    fn batch_system(&self) -> BatchSystem {
        BatchSystem::Lsf
    }

    fn interpreter(&self) -> &'static str {
        "/bin/bash"
    }

    fn write_directive(
        &self,
        out: &mut ScriptWriter<'_>,
        key: &str,
        value: &str,
    ) -> io::Result<()> {
        out.write_line(&format!("#BSUB -{key} {value}"))
    }

    fn begin(&self, out: &mut ScriptWriter<'_>, ctx: &ScriptContext<'_>) -> io::Result<()> {
        out.shebang(self.interpreter())?;
        for (key, value) in ctx.directives.iter() {
            self.write_directive(out, key, value)?;
        }
        self.write_directive(out, "n", &ctx.ncpus.to_string())?;
        self.write_directive(out, "e", &format!("{}/{}-%J.err", ctx.error_dir, ctx.stem))?;
        self.write_directive(out, "o", &format!("{}/{}-%J.out", ctx.output_dir, ctx.stem))?;
        self.write_directive(out, "J", ctx.stem)
    }

    fn write_task(
        &self,
        out: &mut ScriptWriter<'_>,
        line: &str,
        _row: &InvocationRow,
    ) -> io::Result<()> {
        out.write_line(line)
    }

    fn finish(&self, _out: &mut ScriptWriter<'_>, _ctx: &ScriptContext<'_>) -> io::Result<()> {
        Ok(())
    }

    fn write_job(&self, out: &mut ScriptWriter<'_>, script: &str) -> io::Result<()> {
        out.write_line(&format!("bsub < {script}"))
    }
}

impl ScriptEmitter for LocalEmitter {
    fn batch_system(&self) -> BatchSystem {
        BatchSystem::Local
    }

    fn interpreter(&self) -> &'static str {
        "/bin/bash"
    }

    fn write_directive(
        &self,
        _out: &mut ScriptWriter<'_>,
        _key: &str,
        _value: &str,
    ) -> io::Result<()> {
        Ok(())
    }

    fn begin(&self, out: &mut ScriptWriter<'_>, _ctx: &ScriptContext<'_>) -> io::Result<()> {
        out.shebang(self.interpreter())?;
        out.write_line("{")
    }

    fn write_task(
        &self,
        out: &mut ScriptWriter<'_>,
        line: &str,
        _row: &InvocationRow,
    ) -> io::Result<()> {
        out.write_line(line)
    }

    fn finish(&self, out: &mut ScriptWriter<'_>, ctx: &ScriptContext<'_>) -> io::Result<()> {
        out.write_line(&format!(
            "}} 1>{}/{}.out 2>{}/{}.err",
            ctx.output_dir, ctx.stem, ctx.error_dir, ctx.stem
        ))
    }

    fn write_job(&self, out: &mut ScriptWriter<'_>, script: &str) -> io::Result<()> {
        out.write_line(script)
    }
}

/// CPUs to request for a script: the largest thread count among its rows.
///
/// Rows without a thread count are ignored. If no row has one, or any
/// present value is not a non-negative integer, the result is 1.
pub fn node_cpus(table: &InvocationTable) -> u64 {
    let mut max: Option<u64> = None;
    for row in table.rows() {
        let Some(raw) = row.get(THREADS_COLUMN) else {
            continue;
        };
        match raw.trim().parse::<u64>() {
            Ok(threads) => max = Some(max.map_or(threads, |current| current.max(threads))),
            Err(_) => {
                warn!(value = raw, "non-integer thread count, requesting a single cpu");
                return 1;
            }
        }
    }
    max.unwrap_or(1).max(1)
}
