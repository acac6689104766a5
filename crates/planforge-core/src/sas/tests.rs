use super::*;
use crate::task::OperatorId;

const TINY_TASK: &str = "\
begin_version
3
end_version
begin_metric
1
end_metric
2
begin_variable
var0
-1
2
Atom at(home)
Atom at(work)
end_variable
begin_variable
var1
-1
2
Atom rested()
NegatedAtom rested()
end_variable
1
begin_mutex_group
2
0 0
0 1
end_mutex_group
begin_state
0
0
end_state
begin_goal
1
0 1
end_goal
2
begin_operator
commute
1
1 0
1
0 0 0 1
3
end_operator
begin_operator
rest
0
1
0 1 0 1
1
end_operator
0
";

#[test]
fn parses_a_complete_task() {
    let task = read_task(TINY_TASK.as_bytes()).unwrap();

    assert_eq!(task.num_variables(), 2);
    assert_eq!(task.variable(0).name, "var0");
    assert_eq!(task.fact_name(FactPair::new(0, 1)), "Atom at(work)");
    assert_eq!(task.initial_state_values(), &[0, 0]);
    assert_eq!(task.goal(), &[FactPair::new(0, 1)]);
    assert!(task.uses_metric());

    assert_eq!(task.num_operators(), 2);
    let commute = task.operator(OperatorId::new(0));
    assert_eq!(commute.name, "commute");
    // Prevail condition plus the effect precondition.
    assert_eq!(commute.preconditions.len(), 2);
    assert!(commute.preconditions.contains(&FactPair::new(1, 0)));
    assert!(commute.preconditions.contains(&FactPair::new(0, 0)));
    assert_eq!(commute.effects.len(), 1);
    assert_eq!(commute.effects[0].fact, FactPair::new(0, 1));
    assert_eq!(task.operator_cost(OperatorId::new(0)), 3);

    let rest = task.operator(OperatorId::new(1));
    // Conditional effect: one condition, no effect precondition.
    assert_eq!(rest.preconditions.len(), 0);
    assert_eq!(rest.effects[0].conditions.len(), 1);
    assert_eq!(rest.effects[0].conditions[0], FactPair::new(0, 1));
}

#[test]
fn unit_cost_when_metric_absent() {
    let text = TINY_TASK.replacen("begin_metric\n1", "begin_metric\n0", 1);
    let task = read_task(text.as_bytes()).unwrap();
    assert_eq!(task.operator_cost(OperatorId::new(0)), 1);
    assert!(task.is_unit_cost());
}

#[test]
fn rejects_unknown_version() {
    let text = TINY_TASK.replacen("begin_version\n3", "begin_version\n4", 1);
    match read_task(text.as_bytes()) {
        Err(TaskError::UnsupportedVersion(4)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn rejects_garbage_with_line_number() {
    let text = TINY_TASK.replacen("begin_goal", "begin_gol", 1);
    match read_task(text.as_bytes()) {
        Err(TaskError::Parse { line, .. }) => assert!(line > 0),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn truncated_input_reports_eof() {
    let text = &TINY_TASK[..TINY_TASK.len() / 2];
    assert!(read_task(text.as_bytes()).is_err());
}

#[test]
fn parses_axiom_rules() {
    let text = "\
begin_version
3
end_version
begin_metric
0
end_metric
2
begin_variable
base
-1
2
Atom p()
NegatedAtom p()
end_variable
begin_variable
derived
0
2
Atom d()
NegatedAtom d()
end_variable
0
begin_state
0
0
end_state
begin_goal
1
1 1
end_goal
0
1
begin_rule
1
0 1
1 0 1
end_rule
";
    let task = read_task(text.as_bytes()).unwrap();
    assert_eq!(task.num_axioms(), 1);
    let axiom = &task.axioms()[0];
    assert_eq!(axiom.fact, FactPair::new(1, 1));
    // Body condition plus the head precondition.
    assert_eq!(axiom.conditions.len(), 2);
    assert!(task.variable(1).is_derived());
}
