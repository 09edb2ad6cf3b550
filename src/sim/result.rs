use std::fmt::{self, Write as _};

use super::job::Process;
use crate::{
    core::{ProcessId, SchedError, Ticks},
    scheduler::Algorithm,
};

/// Per-process outcome of one scheduling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    pub id: ProcessId,
    pub arrival: Ticks,
    pub burst: Ticks,
    pub start_time: Ticks,
    pub completion_time: Ticks,
    pub waiting_time: Ticks,
    pub turnaround_time: Ticks,
}

impl SimulationResult {
    /// Derives turnaround and waiting time from when the process finished.
    pub fn from_completion(process: &Process, start_time: Ticks, completion_time: Ticks) -> Self {
        let turnaround_time = completion_time - process.arrival();
        Self {
            id: process.id(),
            arrival: process.arrival(),
            burst: process.burst(),
            start_time,
            completion_time,
            waiting_time: turnaround_time - process.burst(),
            turnaround_time,
        }
    }

    // Time to first run
    pub fn response_time(&self) -> Ticks {
        self.start_time - self.arrival
    }

    fn check(&self, algorithm: &'static str) -> Result<(), SchedError> {
        let fail = |detail: String| Err(SchedError::invariant(algorithm, self.id, detail));

        if self.waiting_time < 0 {
            return fail(format!("negative waiting time {}", self.waiting_time));
        }
        if self.turnaround_time < 0 {
            return fail(format!("negative turnaround time {}", self.turnaround_time));
        }
        if self.turnaround_time != self.burst + self.waiting_time {
            return fail(format!(
                "turnaround {} != burst {} + waiting {}",
                self.turnaround_time, self.burst, self.waiting_time
            ));
        }
        if self.completion_time != self.arrival + self.turnaround_time {
            return fail(format!(
                "completion {} != arrival {} + turnaround {}",
                self.completion_time, self.arrival, self.turnaround_time
            ));
        }
        if self.start_time < self.arrival || self.start_time > self.completion_time - self.burst {
            return fail(format!(
                "start {} outside {}..={}",
                self.start_time,
                self.arrival,
                self.completion_time - self.burst
            ));
        }
        Ok(())
    }
}

/// Means over all processes, kept as exact totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateResult {
    pub total_waiting: Ticks,
    pub total_turnaround: Ticks,
    pub count: usize,
}

impl AggregateResult {
    pub fn average_waiting_time(&self) -> f64 {
        self.total_waiting as f64 / self.count as f64
    }

    pub fn average_turnaround_time(&self) -> f64 {
        self.total_turnaround as f64 / self.count as f64
    }
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Average waiting time: {:.2}\nAverage turnaround time: {:.2}",
            self.average_waiting_time(),
            self.average_turnaround_time()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Process,
    ArrivalTime,
    BurstTime,
    StartTime,
    CompletionTime,
    WaitingTime,
    TurnaroundTime,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Self::Process => "Process",
            Self::ArrivalTime => "Arrival_Time",
            Self::BurstTime => "Burst_Time",
            Self::StartTime => "Start_Time",
            Self::CompletionTime => "Completion_Time",
            Self::WaitingTime => "Waiting_Time",
            Self::TurnaroundTime => "Turn_Around_Time",
        }
    }

    fn cell(&self, row: &SimulationResult) -> String {
        match self {
            Self::Process => format!("P{}", row.id),
            Self::ArrivalTime => row.arrival.to_string(),
            Self::BurstTime => row.burst.to_string(),
            Self::StartTime => row.start_time.to_string(),
            Self::CompletionTime => row.completion_time.to_string(),
            Self::WaitingTime => row.waiting_time.to_string(),
            Self::TurnaroundTime => row.turnaround_time.to_string(),
        }
    }
}

/// Per-process results indexed by original process id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<SimulationResult>,
}

impl ResultTable {
    /// Sorts rows by id and verifies every row before accepting them.
    pub fn new(algorithm: &'static str, mut rows: Vec<SimulationResult>) -> Result<Self, SchedError> {
        rows.sort_by_key(|row| row.id);
        for row in &rows {
            row.check(algorithm)?;
        }
        Ok(Self { rows })
    }

    pub fn get(&self, id: ProcessId) -> Option<&SimulationResult> {
        self.rows
            .binary_search_by_key(&id, |row| row.id)
            .ok()
            .map(|index| &self.rows[index])
    }

    pub fn rows(&self) -> &[SimulationResult] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationResult> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn aggregate(&self) -> AggregateResult {
        self.rows.iter().fold(
            AggregateResult {
                count: self.rows.len(),
                ..AggregateResult::default()
            },
            |acc, row| AggregateResult {
                total_waiting: acc.total_waiting + row.waiting_time,
                total_turnaround: acc.total_turnaround + row.turnaround_time,
                count: acc.count,
            },
        )
    }

    /// Column set reported for each algorithm; always carries waiting and
    /// turnaround time.
    pub fn columns(algorithm: &Algorithm) -> &'static [Column] {
        match algorithm {
            Algorithm::Fcfs => &[
                Column::Process,
                Column::ArrivalTime,
                Column::BurstTime,
                Column::CompletionTime,
                Column::WaitingTime,
                Column::TurnaroundTime,
            ],
            Algorithm::Priority => &[
                Column::Process,
                Column::StartTime,
                Column::CompletionTime,
                Column::TurnaroundTime,
                Column::WaitingTime,
            ],
            Algorithm::RoundRobin { .. } => &[
                Column::Process,
                Column::ArrivalTime,
                Column::BurstTime,
                Column::WaitingTime,
                Column::TurnaroundTime,
            ],
        }
    }

    pub fn render(&self, algorithm: &Algorithm) -> String {
        let columns = Self::columns(algorithm);
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| columns.iter().map(|c| c.cell(row)).collect())
            .collect();
        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].len())
                    .chain(std::iter::once(c.header().len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for (c, w) in columns.iter().zip(&widths) {
            let _ = write!(out, "{:>w$}  ", c.header(), w = *w);
        }
        out.truncate(out.trim_end().len());
        out.push('\n');
        for row in &cells {
            let start = out.len();
            for (cell, w) in row.iter().zip(&widths) {
                let _ = write!(out, "{cell:>w$}  ", w = *w);
            }
            out.truncate(start + out[start..].trim_end().len());
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Run {
        id: ProcessId,
        start: Ticks,
        end: Ticks,
    },
    Idle {
        start: Ticks,
        end: Ticks,
    },
}

impl Segment {
    pub fn duration(&self) -> Ticks {
        match *self {
            Self::Run { start, end, .. } | Self::Idle { start, end } => end - start,
        }
    }
}

/// Execution order over simulated time, including repeats from preemption.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_run(&mut self, id: ProcessId, start: Ticks, end: Ticks) {
        debug_assert!(start < end, "empty run segment for P{id}");
        self.segments.push(Segment::Run { id, start, end });
    }

    /// Extends the trailing idle segment when it ends where this one starts.
    pub fn push_idle(&mut self, start: Ticks, end: Ticks) {
        if start >= end {
            return;
        }
        if let Some(Segment::Idle { end: last_end, .. }) = self.segments.last_mut() {
            if *last_end == start {
                *last_end = end;
                return;
            }
        }
        self.segments.push(Segment::Idle { start, end });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn gantt_sequence(&self) -> Vec<ProcessId> {
        self.segments
            .iter()
            .filter_map(|s| match *s {
                Segment::Run { id, .. } => Some(id),
                Segment::Idle { .. } => None,
            })
            .collect()
    }

    pub fn busy_time(&self) -> Ticks {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Run { .. }))
            .map(Segment::duration)
            .sum()
    }

    pub fn idle_time(&self) -> Ticks {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Idle { .. }))
            .map(Segment::duration)
            .sum()
    }

    pub fn render(&self) -> String {
        self.gantt_sequence()
            .iter()
            .map(|id| format!("P{id}"))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Uniform output of every engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub algorithm: Algorithm,
    pub table: ResultTable,
    pub timeline: Timeline,
}

impl Schedule {
    pub fn aggregate(&self) -> AggregateResult {
        self.table.aggregate()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.algorithm)?;
        writeln!(f, "Gantt chart: {}", self.timeline.render())?;
        write!(f, "{}", self.table.render(&self.algorithm))?;
        write!(f, "{}", self.aggregate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_waiting_is_an_invariant_violation() {
        let p = Process::new(1, 4, 3);
        // Completed before it could have run
        let row = SimulationResult::from_completion(&p, 4, 5);
        let err = ResultTable::new("fcfs", vec![row]).unwrap_err();
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn rows_are_indexed_by_id() {
        let rows = vec![
            SimulationResult::from_completion(&Process::new(2, 0, 2), 3, 5),
            SimulationResult::from_completion(&Process::new(1, 0, 3), 0, 3),
        ];
        let table = ResultTable::new("fcfs", rows).unwrap();
        assert_eq!(table.rows()[0].id, 1);
        assert_eq!(table.get(2).unwrap().waiting_time, 3);
        assert!(table.get(9).is_none());

        let agg = table.aggregate();
        assert_eq!(agg.total_waiting, 3);
        assert_eq!(agg.total_turnaround, 8);
        assert_eq!(agg.average_turnaround_time(), 4.0);
    }

    #[test]
    fn idle_segments_coalesce() {
        let mut timeline = Timeline::new();
        timeline.push_idle(0, 1);
        timeline.push_idle(1, 2);
        timeline.push_run(1, 2, 4);
        timeline.push_run(1, 4, 5);
        assert_eq!(timeline.segments().len(), 3);
        assert_eq!(timeline.idle_time(), 2);
        assert_eq!(timeline.busy_time(), 3);
        assert_eq!(timeline.render(), "P1 -> P1");
    }

    #[test]
    fn render_uses_algorithm_columns() {
        let rows = vec![SimulationResult::from_completion(&Process::new(1, 0, 3), 0, 3)];
        let table = ResultTable::new("round-robin", rows).unwrap();
        let text = table.render(&Algorithm::RoundRobin { quantum: 2 });
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("Process"));
        assert!(header.ends_with("Turn_Around_Time"));
        assert!(!header.contains("Start_Time"));
    }
}
