#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use promise_pair::{create_future_pair, Error, Outcome};
    use std::sync::{Arc, Barrier};
    use std::{thread, time::Duration, time::Instant};

    #[test]
    fn test_get_receives_value_set_later() {
        let (promise, future) = create_future_pair::<String, String>();
        let started = Instant::now();
        let consumer = thread::spawn(move || future.get());

        thread::sleep(Duration::from_millis(1));
        promise.set_value("hello".to_owned()).unwrap();

        let outcome = consumer.join().unwrap().unwrap();
        assert_eq!(outcome.value().map(String::as_str), Some("hello"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_try_get_times_out_then_sees_value() {
        let (promise, future) = create_future_pair::<i32, ()>();

        let timed_out = future.try_get(Duration::from_millis(1)).unwrap_err();
        assert!(timed_out.is_timeout());

        promise.set_value(42).unwrap();
        let outcome = future.try_get(Duration::from_millis(1)).unwrap();
        assert_eq!(outcome.value(), Some(&42));
        assert_eq!(outcome.error(), None);
        assert!(!outcome.is_error());
    }

    #[test]
    fn test_unfulfilled_future_keeps_timing_out() {
        let (_promise, future) = create_future_pair::<i32, ()>();
        for _ in 0..5 {
            assert_eq!(
                future.try_get(Duration::from_millis(2)),
                Err(Error::Timeout(Duration::from_millis(2)))
            );
        }
    }

    #[test]
    fn test_error_integrity() {
        let (promise, future) = create_future_pair::<String, std::io::ErrorKind>();
        promise.set_error(std::io::ErrorKind::NotFound).unwrap();
        let outcome = future.get().unwrap();
        assert_eq!(outcome.error(), Some(&std::io::ErrorKind::NotFound));
        assert_eq!(outcome.value(), None);
        assert!(outcome.is_error());
    }

    #[test]
    fn test_concurrent_set_value_has_single_winner() {
        for _ in 0..50 {
            let (promise, future) = create_future_pair::<u32, ()>();
            let promise = Arc::new(promise);
            let barrier = Arc::new(Barrier::new(2));
            let contenders: Vec<_> = [1, 2]
                .into_iter()
                .map(|value| {
                    let (promise, barrier) = (promise.clone(), barrier.clone());
                    thread::spawn(move || {
                        barrier.wait();
                        promise.set_value(value).map(|()| value)
                    })
                })
                .collect();
            let results: Vec<_> = contenders.into_iter().map(|t| t.join().unwrap()).collect();

            let winners: Vec<u32> = results.iter().filter_map(|r| r.clone().ok()).collect();
            assert_eq!(winners.len(), 1);
            assert!(results.contains(&Err(Error::AlreadySet)));
            assert_eq!(*future.get().unwrap(), Outcome::Value(winners[0]));
        }
    }

    #[test]
    fn test_value_visible_to_retry_after_timeouts() {
        let (promise, future) = create_future_pair::<&'static str, ()>();
        let consumer = thread::spawn(move || {
            let mut timeouts = 0;
            loop {
                match future.try_get(Duration::from_millis(1)) {
                    Ok(outcome) => return (outcome, timeouts),
                    Err(err) if err.is_timeout() => timeouts += 1,
                    Err(err) => panic!("unexpected {err}"),
                }
            }
        });
        thread::sleep(Duration::from_millis(20));
        promise.set_value("🍓").unwrap();
        let (outcome, timeouts) = consumer.join().unwrap();
        assert_eq!(outcome.value(), Some(&"🍓"));
        assert!(timeouts > 0);
    }

    #[test]
    fn test_async_and_blocking_reads_agree() {
        let (promise, future) = create_future_pair::<u64, ()>();
        let waiter = thread::spawn(move || {
            let mut future = future;
            let first = block_on(&mut future).unwrap();
            let second = future.get().unwrap();
            Arc::ptr_eq(&first, &second)
        });
        promise.set_value(7).unwrap();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_await_pending_future() {
        let (promise, future) = create_future_pair::<u64, ()>();
        let waiter = thread::spawn(move || block_on(future));
        thread::sleep(Duration::from_millis(5));
        promise.set_value(9).unwrap();
        assert_eq!(*waiter.join().unwrap().unwrap(), Outcome::Value(9));
    }
}
