use polymock::*;

#[fake]
trait Counter {
    fn bump(&self, by: u32) -> u32;
}

#[fake]
trait Logger {
    fn log(&self, line: String);
}

fn bump_forever(proxy: &mut Proxy<dyn Counter>) {
    proxy
        .stub::<CounterFake::bump>(
            ArgMatcher::any(),
            Behavior::<CounterFake::bump>::answers(|(by,)| by + 1).into(),
        )
        .unwrap();
}

#[test]
fn sequence_numbers_are_shared_within_a_session() {
    let session = Session::new();
    let mut counter = session.proxy::<dyn Counter>();
    let mut logger = session.proxy::<dyn Logger>();
    bump_forever(&mut counter);
    logger
        .stub::<LoggerFake::log>(ArgMatcher::any(), Behavior::returns(()).into())
        .unwrap();

    counter.get().bump(1);
    logger.get().log("a".to_string());
    counter.get().bump(2);

    let seqs: Vec<(usize, String)> = session
        .invocations()
        .iter()
        .map(|invocation| (invocation.seq(), invocation.to_string()))
        .collect();
    assert_eq!(
        vec![
            (1, "Counter::bump(1)".to_string()),
            (2, "Logger::log(\"a\")".to_string()),
            (3, "Counter::bump(2)".to_string()),
        ],
        seqs
    );
    assert_eq!(2, counter.invocations().len());
    assert_eq!(1, logger.invocations().len());
}

#[test]
fn separate_sessions_do_not_see_each_other() {
    let mut first = Proxy::<dyn Counter>::new();
    let mut second = Proxy::<dyn Counter>::new();
    bump_forever(&mut first);
    bump_forever(&mut second);

    first.get().bump(1);
    first.get().bump(1);
    second.get().bump(1);

    assert_eq!(2, first.session().invocations().len());
    assert_eq!(1, second.session().invocations().len());
    assert_eq!(1, second.invocations()[0].seq());
}

#[test]
fn sessions_on_different_threads_are_independent() {
    let handles: Vec<_> = (0..4)
        .map(|thread| {
            std::thread::spawn(move || {
                let session = Session::new();
                let mut counter = session.proxy::<dyn Counter>();
                bump_forever(&mut counter);

                for _ in 0..=thread {
                    counter.get().bump(thread);
                }

                session
                    .invocations()
                    .iter()
                    .map(|invocation| invocation.seq())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (thread, handle) in handles.into_iter().enumerate() {
        let seqs = handle.join().unwrap();
        assert_eq!((1..=thread + 1).collect::<Vec<_>>(), seqs);
    }
}

#[test]
fn a_session_handle_can_be_shared_between_threads() {
    let session = Session::new();

    std::thread::scope(|scope| {
        for _ in 0..3 {
            let session = session.clone();
            scope.spawn(move || {
                let mut counter = session.proxy::<dyn Counter>();
                bump_forever(&mut counter);
                counter.get().bump(0);
            });
        }
    });

    let mut seqs: Vec<usize> = session
        .invocations()
        .iter()
        .map(|invocation| invocation.seq())
        .collect();
    seqs.sort();
    assert_eq!(vec![1, 2, 3], seqs);

    let mut proxies: Vec<ProxyId> = session
        .invocations()
        .iter()
        .map(|invocation| invocation.proxy())
        .collect();
    proxies.sort();
    proxies.dedup();
    assert_eq!(3, proxies.len());
}
