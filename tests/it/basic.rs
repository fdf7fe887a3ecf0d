use polymock::*;

#[fake]
trait Calculator {
    fn add(&self, a: i32, b: i32) -> i32;
    fn negate(&self, a: i32) -> i32;
    fn reset(&mut self);
    fn describe(&self, label: &str, digits: Vec<u8>) -> String;
}

fn sum_twice(calc: &dyn Calculator) -> i32 {
    calc.add(1, 2) + calc.add(3, 4)
}

#[test]
fn every_method_gets_a_distinct_stable_slot() {
    let slots = [
        resolve::<CalculatorFake::add>().unwrap(),
        resolve::<CalculatorFake::negate>().unwrap(),
        resolve::<CalculatorFake::reset>().unwrap(),
        resolve::<CalculatorFake::describe>().unwrap(),
    ];

    assert_eq!(
        [SlotIndex(0), SlotIndex(1), SlotIndex(2), SlotIndex(3)],
        slots
    );
    assert_eq!(slots[1], resolve::<CalculatorFake::negate>().unwrap());
    assert_eq!(
        &["add", "negate", "reset", "describe"],
        <dyn Calculator as Interface>::METHODS
    );
}

#[test]
fn once_then_forever() {
    let mut calc = Proxy::<dyn Calculator>::new();
    calc.stub::<CalculatorFake::add>(
        ArgMatcher::any(),
        BehaviorSequence::new()
            .then(Behavior::returns_once(1))
            .then(Behavior::returns(2)),
    )
    .unwrap();

    assert_eq!(1, calc.get().add(0, 0));
    assert_eq!(2, calc.get().add(0, 0));
    assert_eq!(2, calc.get().add(0, 0));
    assert_eq!(2, calc.get().add(0, 0));
}

#[test]
fn passes_as_trait_object() {
    let mut calc = Proxy::<dyn Calculator>::new();
    calc.stub::<CalculatorFake::add>(
        ArgMatcher::any(),
        Behavior::<CalculatorFake::add>::answers(|(a, b)| a + b).into(),
    )
    .unwrap();

    assert_eq!(10, sum_twice(calc.get()));
    assert_eq!(2, calc.invocations().len());
}

#[test]
fn most_recent_stubbing_wins() {
    let mut calc = Proxy::<dyn Calculator>::new();
    calc.stub::<CalculatorFake::negate>(ArgMatcher::any(), Behavior::returns(0).into())
        .unwrap();
    calc.stub::<CalculatorFake::negate>(ArgMatcher::using((5,)), Behavior::returns(-5).into())
        .unwrap();

    assert_eq!(-5, calc.get().negate(5));
    assert_eq!(0, calc.get().negate(6));

    calc.stub::<CalculatorFake::negate>(ArgMatcher::any(), Behavior::returns(42).into())
        .unwrap();

    assert_eq!(42, calc.get().negate(5));
}

#[test]
fn stub_method_replaces_all_stubbings() {
    let mut calc = Proxy::<dyn Calculator>::new();
    calc.stub::<CalculatorFake::negate>(ArgMatcher::using((1,)), Behavior::returns(-1).into())
        .unwrap();
    calc.stub_method::<CalculatorFake::negate>(
        InvocationHandler::<CalculatorFake::negate>::new()
            .with(ArgMatcher::matching(|(a,)| *a > 0), Behavior::returns(1).into())
            .with(ArgMatcher::matching(|(a,)| *a < 0), Behavior::returns(-1).into()),
    )
    .unwrap();

    assert_eq!(1, calc.get().negate(1));
    assert_eq!(-1, calc.get().negate(-7));
}

#[test]
fn borrowed_arguments_are_snapshotted() {
    let mut calc = Proxy::<dyn Calculator>::new();
    calc.stub::<CalculatorFake::describe>(
        ArgMatcher::using(("x".to_string(), vec![1, 2])),
        Behavior::<CalculatorFake::describe>::answers(|(label, digits)| {
            format!("{label}{digits:?}")
        })
        .into(),
    )
    .unwrap();

    let label = String::from("x");
    assert_eq!("x[1, 2]", calc.get().describe(&label, vec![1, 2]));
    drop(label);

    let invocations = calc.invocations();
    assert_eq!(
        "Calculator::describe(\"x\", [1, 2])",
        invocations[0].to_string()
    );
    assert_eq!(
        Some(&("x".to_string(), vec![1, 2])),
        invocations[0].args::<CalculatorFake::describe>()
    );
}

#[test]
fn mutable_receiver() {
    let mut calc = Proxy::<dyn Calculator>::new();
    calc.stub::<CalculatorFake::reset>(
        ArgMatcher::any(),
        Behavior::returns_once(()).into(),
    )
    .unwrap();

    calc.get_mut().reset();

    assert!(calc.is_stubbed::<CalculatorFake::reset>());
    assert!(!calc.is_stubbed::<CalculatorFake::add>());
}

#[test]
fn try_call_reports_instead_of_panicking() {
    let calc = Proxy::<dyn Calculator>::new();

    let error = calc.try_call::<CalculatorFake::negate>((1,)).unwrap_err();
    assert_eq!(
        "Calculator::negate(1): Unmocked method called. No stubbing installed.",
        error.to_string()
    );
    assert!(calc.session().failures().is_empty());
}
