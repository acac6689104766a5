//! Parser for the translator text format.
//!
//! The format is line oriented and section delimited
//! (`begin_variable`/`end_variable` and friends). Mutex groups are accepted
//! and ignored: they carry no information the search layer uses.

use std::io::BufRead;

use smallvec::SmallVec;

use crate::error::{Result, TaskError};
use crate::task::{Axiom, Effect, FactPair, Operator, PlanningTask, Variable};

const SUPPORTED_VERSION: i32 = 3;

struct LineReader<R> {
    input: R,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(input: R) -> Self {
        Self { input, line: 0 }
    }

    fn next_line(&mut self) -> Result<String> {
        let mut buffer = String::new();
        let read = self.input.read_line(&mut buffer)?;
        self.line += 1;
        if read == 0 {
            return Err(self.error("unexpected end of input"));
        }
        Ok(buffer.trim_end().to_string())
    }

    fn expect(&mut self, magic: &str) -> Result<()> {
        let line = self.next_line()?;
        if line != magic {
            return Err(self.error(format!("expected '{magic}', found '{line}'")));
        }
        Ok(())
    }

    fn next_int(&mut self) -> Result<i32> {
        let line = self.next_line()?;
        self.parse_int(&line)
    }

    fn parse_int(&self, token: &str) -> Result<i32> {
        token
            .trim()
            .parse()
            .map_err(|_| self.error(format!("expected an integer, found '{token}'")))
    }

    fn next_ints(&mut self, expected: usize) -> Result<Vec<i32>> {
        let line = self.next_line()?;
        let values: Vec<i32> = line
            .split_whitespace()
            .map(|token| self.parse_int(token))
            .collect::<Result<_>>()?;
        if values.len() != expected {
            return Err(self.error(format!(
                "expected {expected} integers, found {}",
                values.len()
            )));
        }
        Ok(values)
    }

    fn next_fact(&mut self) -> Result<FactPair> {
        let values = self.next_ints(2)?;
        if values[0] < 0 {
            return Err(self.error("negative variable index"));
        }
        Ok(FactPair::new(values[0] as usize, values[1]))
    }

    fn error(&self, message: impl Into<String>) -> TaskError {
        TaskError::Parse {
            line: self.line,
            message: message.into(),
        }
    }
}

/// Reads a complete task from `input`.
pub fn read_task<R: BufRead>(input: R) -> Result<PlanningTask> {
    let mut reader = LineReader::new(input);

    reader.expect("begin_version")?;
    let version = reader.next_int()?;
    if version != SUPPORTED_VERSION {
        return Err(TaskError::UnsupportedVersion(version));
    }
    reader.expect("end_version")?;

    reader.expect("begin_metric")?;
    let use_metric = reader.next_int()? == 1;
    reader.expect("end_metric")?;

    let num_variables = reader.next_int()? as usize;
    let mut variables = Vec::with_capacity(num_variables);
    for _ in 0..num_variables {
        variables.push(read_variable(&mut reader)?);
    }

    // Mutex groups: parsed past, not kept.
    let num_mutexes = reader.next_int()?;
    for _ in 0..num_mutexes {
        reader.expect("begin_mutex_group")?;
        let size = reader.next_int()?;
        for _ in 0..size {
            reader.next_fact()?;
        }
        reader.expect("end_mutex_group")?;
    }

    reader.expect("begin_state")?;
    let mut initial_state_values = Vec::with_capacity(num_variables);
    for _ in 0..num_variables {
        initial_state_values.push(reader.next_int()?);
    }
    reader.expect("end_state")?;

    reader.expect("begin_goal")?;
    let num_goals = reader.next_int()?;
    let mut goal = Vec::with_capacity(num_goals as usize);
    for _ in 0..num_goals {
        goal.push(reader.next_fact()?);
    }
    reader.expect("end_goal")?;

    let num_operators = reader.next_int()? as usize;
    let mut operators = Vec::with_capacity(num_operators);
    for _ in 0..num_operators {
        operators.push(read_operator(&mut reader, use_metric)?);
    }

    let num_axioms = reader.next_int()? as usize;
    let mut axioms = Vec::with_capacity(num_axioms);
    for _ in 0..num_axioms {
        axioms.push(read_axiom(&mut reader)?);
    }

    PlanningTask::new(
        variables,
        operators,
        axioms,
        initial_state_values,
        goal,
        use_metric,
    )
}

fn read_variable<R: BufRead>(reader: &mut LineReader<R>) -> Result<Variable> {
    reader.expect("begin_variable")?;
    let name = reader.next_line()?;
    let axiom_layer = reader.next_int()?;
    let domain_size = reader.next_int()?;
    if domain_size < 1 {
        return Err(reader.error("variable domain must not be empty"));
    }
    let mut fact_names = Vec::with_capacity(domain_size as usize);
    for _ in 0..domain_size {
        fact_names.push(reader.next_line()?);
    }
    reader.expect("end_variable")?;
    Ok(Variable {
        name,
        domain_size,
        axiom_layer,
        // Derived variables start from their value in the initial state
        // description; the translator always emits 0 there.
        default_value: 0,
        fact_names,
    })
}

fn read_operator<R: BufRead>(reader: &mut LineReader<R>, use_metric: bool) -> Result<Operator> {
    reader.expect("begin_operator")?;
    let name = reader.next_line()?;

    let num_prevail = reader.next_int()?;
    let mut preconditions: SmallVec<[FactPair; 4]> = SmallVec::new();
    for _ in 0..num_prevail {
        preconditions.push(reader.next_fact()?);
    }

    let num_effects = reader.next_int()?;
    let mut effects = Vec::with_capacity(num_effects as usize);
    for _ in 0..num_effects {
        let line = reader.next_line()?;
        let values: Vec<i32> = line
            .split_whitespace()
            .map(|token| reader.parse_int(token))
            .collect::<Result<_>>()?;
        // <#conditions> (var value)* <var> <pre> <post>
        let count = *values
            .first()
            .ok_or_else(|| reader.error("empty effect line"))?;
        if count < 0 {
            return Err(reader.error("negative effect condition count"));
        }
        let num_conditions = count as usize;
        if values.len() != 1 + 2 * num_conditions + 3 {
            return Err(reader.error("malformed effect line"));
        }
        let mut conditions: SmallVec<[FactPair; 2]> = SmallVec::new();
        for i in 0..num_conditions {
            let var = values[1 + 2 * i];
            if var < 0 {
                return Err(reader.error("negative variable index"));
            }
            conditions.push(FactPair::new(var as usize, values[2 + 2 * i]));
        }
        let base = 1 + 2 * num_conditions;
        let var = values[base];
        if var < 0 {
            return Err(reader.error("negative variable index"));
        }
        let var = var as usize;
        let pre = values[base + 1];
        let post = values[base + 2];
        if pre != -1 {
            preconditions.push(FactPair::new(var, pre));
        }
        effects.push(Effect {
            conditions,
            fact: FactPair::new(var, post),
        });
    }

    let cost_line = reader.next_int()?;
    reader.expect("end_operator")?;

    Ok(Operator {
        name,
        preconditions,
        effects,
        cost: if use_metric { cost_line } else { 1 },
    })
}

fn read_axiom<R: BufRead>(reader: &mut LineReader<R>) -> Result<Axiom> {
    reader.expect("begin_rule")?;
    let num_conditions = reader.next_int()?;
    let mut conditions: SmallVec<[FactPair; 4]> = SmallVec::new();
    for _ in 0..num_conditions {
        conditions.push(reader.next_fact()?);
    }
    // <var> <pre> <post>: pre is an extra condition on the head variable
    // unless it is -1.
    let values = reader.next_ints(3)?;
    if values[0] < 0 {
        return Err(reader.error("negative variable index"));
    }
    let var = values[0] as usize;
    if values[1] != -1 {
        conditions.push(FactPair::new(var, values[1]));
    }
    reader.expect("end_rule")?;
    Ok(Axiom {
        conditions,
        fact: FactPair::new(var, values[2]),
    })
}

#[cfg(test)]
mod tests;
