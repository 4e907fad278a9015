//! Background job bookkeeping.
//!
//! The `JobManager` owns every `Job` the shell launched in the background,
//! most recent first, and forgets a job once its process has been reaped.

use std::collections::VecDeque;
use std::fmt;
use std::io::Write;

use log::{debug, info, warn};

use crate::{
    core::job::{Job, ProcessId},
    errors::Result,
    execute_command,
};

#[derive(Default)]
pub struct JobManager {
    jobs: VecDeque<Job>,
    /// Reaped pids that had no job yet, e.g. a background child that exited
    /// before it was registered. Settled at the next notification.
    unclaimed: Vec<ProcessId>,
}

impl JobManager {
    /// Registers a newly launched background job and announces it.
    pub fn add(&mut self, job: Job, stdout: &mut dyn Write) -> Result<()> {
        if let Some(stale) = self.take(job.id()) {
            warn!("replacing stale job with reused pid: {:?}", stale);
        }

        writeln!(stdout, "{}", job)?;
        debug!("added job {}", job.id());
        self.jobs.push_front(job);
        Ok(())
    }

    pub fn find(&self, pid: ProcessId) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id() == pid)
    }

    /// Unlinks the job for `pid` and reports its termination. The job is
    /// handed back to the caller.
    pub fn remove(&mut self, pid: ProcessId, stdout: &mut dyn Write) -> Result<Option<Job>> {
        let job = match self.take(pid) {
            Some(job) => job,
            None => return Ok(None),
        };

        writeln!(stdout, "{} has terminated.", job)?;
        debug!("removed job {}", pid);
        Ok(Some(job))
    }

    /// Prints every job, most recent first, followed by the job count.
    pub fn list(&self, stdout: &mut dyn Write) -> Result<()> {
        for job in self.iter() {
            writeln!(stdout, "{}", job)?;
        }

        writeln!(stdout, "Total Background Jobs:\t{}", self.len())?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Removes the job for a pid reaped outside of `do_job_notification`. If
    /// no job matches yet, the pid is kept for the next notification.
    pub fn record_terminated(&mut self, pid: ProcessId, stdout: &mut dyn Write) -> Result<()> {
        if self.remove(pid, stdout)?.is_none() {
            debug!("holding unclaimed pid {}", pid);
            self.unclaimed.push(pid);
        }

        Ok(())
    }

    /// Reaps every terminated child without blocking and removes the
    /// matching jobs, reporting each one.
    pub fn do_job_notification(&mut self, stdout: &mut dyn Write) -> Result<()> {
        let reaped = execute_command::reap_terminated()?;
        self.reconcile(&reaped, stdout)
    }

    /// Settles one batch of reaped pids, along with any left unclaimed
    /// since the previous batch, against the registered jobs.
    pub fn reconcile(&mut self, reaped: &[ProcessId], stdout: &mut dyn Write) -> Result<()> {
        let mut batch = std::mem::take(&mut self.unclaimed);
        batch.extend_from_slice(reaped);

        for pid in batch {
            if self.remove(pid, stdout)?.is_none() {
                debug!("reaped pid {} has no job", pid);
            }
        }

        Ok(())
    }

    /// Forgets every job without waiting on or signaling its process.
    pub fn abandon(&mut self) {
        if !self.is_empty() {
            info!("abandoning {} running background jobs", self.len());
        }

        self.jobs.clear();
        self.unclaimed.clear();
    }

    fn take(&mut self, pid: ProcessId) -> Option<Job> {
        let index = self.jobs.iter().position(|job| job.id() == pid)?;
        self.jobs.remove(index)
    }
}

impl fmt::Debug for JobManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} jobs\tunclaimed: {:?}", self.len(), self.unclaimed)?;
        for job in self.iter() {
            writeln!(f, "{}", job)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::{Command, ExecutionMode};

    fn job(pid: i32, program: &str, args: &[&str]) -> Job {
        Job::new(
            ProcessId::from(pid),
            Command::new(program, args, ExecutionMode::Background),
        )
    }

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    fn manager_with(jobs: Vec<Job>) -> JobManager {
        let mut manager = JobManager::default();
        for job in jobs {
            manager.add(job, &mut Vec::new()).unwrap();
        }
        manager
    }

    #[test]
    fn test_add_announces_job() {
        let mut manager = JobManager::default();
        let mut stdout = Vec::new();
        manager
            .add(job(100, "sleep", &["5"]), &mut stdout)
            .unwrap();
        assert_eq!(output(stdout), "100: sleep 5\n");
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_list_most_recent_first() {
        let manager = manager_with(vec![
            job(1, "sleep", &["10"]),
            job(2, "sleep", &["20"]),
            job(3, "yes", &[]),
        ]);

        let mut stdout = Vec::new();
        manager.list(&mut stdout).unwrap();
        assert_eq!(
            output(stdout),
            "3: yes\n2: sleep 20\n1: sleep 10\nTotal Background Jobs:\t3\n"
        );
    }

    #[test]
    fn test_list_empty() {
        let manager = JobManager::default();
        let mut stdout = Vec::new();
        manager.list(&mut stdout).unwrap();
        assert_eq!(output(stdout), "Total Background Jobs:\t0\n");
    }

    #[test]
    fn test_list_is_repeatable() {
        let manager = manager_with(vec![job(7, "sleep", &["1"]), job(8, "sleep", &["2"])]);

        let mut first = Vec::new();
        let mut second = Vec::new();
        manager.list(&mut first).unwrap();
        manager.list(&mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_find() {
        let manager = manager_with(vec![job(1, "a", &[]), job(2, "b", &[])]);
        assert_eq!(manager.find(ProcessId::from(1)).unwrap().command().program(), "a");
        assert!(manager.find(ProcessId::from(3)).is_none());
    }

    #[test]
    fn test_remove_head_middle_and_tail() {
        let mut manager = manager_with(vec![
            job(1, "tail", &[]),
            job(2, "middle", &["x"]),
            job(3, "head", &[]),
        ]);

        let mut stdout = Vec::new();
        let removed = manager.remove(ProcessId::from(2), &mut stdout).unwrap();
        assert_eq!(removed.unwrap().id(), ProcessId::from(2));
        manager.remove(ProcessId::from(3), &mut stdout).unwrap();
        manager.remove(ProcessId::from(1), &mut stdout).unwrap();

        assert_eq!(
            output(stdout),
            "2: middle x has terminated.\n3: head has terminated.\n1: tail has terminated.\n"
        );
        assert!(manager.is_empty());
    }

    #[test]
    fn test_remove_unknown_pid() {
        let mut manager = manager_with(vec![job(1, "a", &[])]);
        let mut stdout = Vec::new();
        assert!(manager.remove(ProcessId::from(9), &mut stdout).unwrap().is_none());
        assert!(stdout.is_empty());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_add_replaces_duplicate_pid() {
        let mut manager = manager_with(vec![job(5, "old", &[]), job(6, "other", &[])]);
        manager.add(job(5, "new", &[]), &mut Vec::new()).unwrap();

        assert_eq!(manager.len(), 2);
        assert_eq!(manager.find(ProcessId::from(5)).unwrap().command().program(), "new");
        let order: Vec<_> = manager.iter().map(|j| j.id().as_raw()).collect();
        assert_eq!(order, vec![5, 6]);
    }

    #[test]
    fn test_reconcile_batch() {
        let mut manager = manager_with(vec![job(1, "a", &[]), job(2, "b", &[]), job(3, "c", &[])]);

        let mut stdout = Vec::new();
        manager
            .reconcile(
                &[ProcessId::from(3), ProcessId::from(42), ProcessId::from(1)],
                &mut stdout,
            )
            .unwrap();

        assert_eq!(output(stdout), "3: c has terminated.\n1: a has terminated.\n");
        let remaining: Vec<_> = manager.iter().map(|j| j.id().as_raw()).collect();
        assert_eq!(remaining, vec![2]);
    }

    #[test]
    fn test_unclaimed_pid_settles_after_registration() {
        let mut manager = JobManager::default();
        let mut stdout = Vec::new();

        // the child was reaped before its job existed
        manager
            .record_terminated(ProcessId::from(11), &mut stdout)
            .unwrap();
        assert!(stdout.is_empty());

        manager.add(job(11, "true", &[]), &mut stdout).unwrap();
        manager.reconcile(&[], &mut stdout).unwrap();

        assert_eq!(output(stdout), "11: true\n11: true has terminated.\n");
        assert!(manager.is_empty());
    }

    #[test]
    fn test_unmatched_unclaimed_pid_is_dropped() {
        let mut manager = JobManager::default();
        let mut stdout = Vec::new();
        manager
            .record_terminated(ProcessId::from(11), &mut stdout)
            .unwrap();
        manager.reconcile(&[], &mut stdout).unwrap();

        manager.add(job(11, "later", &[]), &mut stdout).unwrap();
        manager.reconcile(&[], &mut stdout).unwrap();
        assert_eq!(manager.len(), 1);
        assert_eq!(output(stdout), "11: later\n");
    }

    #[test]
    fn test_abandon_forgets_jobs() {
        let mut manager = manager_with(vec![job(1, "a", &[]), job(2, "b", &[])]);
        manager.abandon();
        assert!(manager.is_empty());
    }
}
