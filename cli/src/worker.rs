//! Runs a blocking batch off the calling thread.
//!
//! The job reports progress through the line sink it is handed; lines are
//! forwarded over a channel so the caller (a terminal, a UI event loop) can
//! display them as they come.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use anyhow::Result;

#[derive(Debug)]
pub enum LogLine {
    Line(String),
    Done(Result<()>),
}

pub struct Worker {
    rx: Receiver<LogLine>,
    handle: JoinHandle<()>,
}

pub fn spawn<F>(job: F) -> Result<Worker>
where
    F: FnOnce(&mut dyn FnMut(String)) -> Result<()> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::Builder::new().name("imagerec-worker".into()).spawn(move || {
        let lines = tx.clone();
        let result = job(&mut |line| {
            // receiver gone: nobody is listening anymore
            let _ = lines.send(LogLine::Line(line));
        });
        if let Err(e) = &result {
            debug!("Worker job failed: {e:?}");
        }
        let _ = tx.send(LogLine::Done(result));
    })?;
    Ok(Worker { rx, handle })
}

impl Worker {
    /// Block until the job ends, handing each line to `on_line` on the
    /// calling thread.
    pub fn drain(self, mut on_line: impl FnMut(&str)) -> Result<()> {
        for message in self.rx.iter() {
            match message {
                LogLine::Line(line) => on_line(&line),
                LogLine::Done(result) => {
                    let _ = self.handle.join();
                    return result;
                }
            }
        }
        match self.handle.join() {
            Err(_) => anyhow::bail!("Worker thread panicked"),
            Ok(()) => anyhow::bail!("Worker stopped without reporting"),
        }
    }
}
