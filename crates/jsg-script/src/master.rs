use std::io;

use crate::emitter::ScriptEmitter;
use crate::layout::OutputLayout;
use crate::writer::ScriptWriter;

/// Writes the master script: creates the log directories if absent, then
/// submits (or, locally, runs) every node script in order.
pub fn write_master_script(
    out: &mut ScriptWriter<'_>,
    emitter: &dyn ScriptEmitter,
    layout: &OutputLayout,
    scripts: &[String],
) -> io::Result<()> {
    out.shebang("/bin/bash")?;
    for dir in [&layout.output_dir, &layout.error_dir] {
        out.write_line(&format!("if [ ! -d {dir} ]; then"))?;
        out.write_line(&format!("    mkdir {dir}"))?;
        out.write_line("fi")?;
    }
    for script in scripts {
        emitter.write_job(out, &format!("{}/{script}", layout.node_dir))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::emitter_for;
    use jsg_config::BatchSystem;

    fn master(system: BatchSystem) -> String {
        let mut buf = Vec::new();
        {
            let mut out = ScriptWriter::new(&mut buf);
            let scripts = vec!["run_a_script.sh".to_string(), "run_b_script.sh".to_string()];
            write_master_script(&mut out, emitter_for(system), &OutputLayout::default(), &scripts)
                .unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn directories_are_created_before_any_job() {
        let text = master(BatchSystem::Slurm);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "#! /bin/bash",
                "if [ ! -d output ]; then",
                "    mkdir output",
                "fi",
                "if [ ! -d error ]; then",
                "    mkdir error",
                "fi",
                "sbatch node/run_a_script.sh",
                "sbatch node/run_b_script.sh",
            ]
        );
    }

    #[test]
    fn job_lines_follow_the_batch_system() {
        assert!(master(BatchSystem::Lsf).ends_with("bsub < node/run_b_script.sh\n"));
        assert!(master(BatchSystem::Local)
            .ends_with("fi\nnode/run_a_script.sh\nnode/run_b_script.sh\n"));
    }
}
