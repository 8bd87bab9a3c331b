extern crate pastel;
extern crate rand;

use pastel::utils::prelude::*;

#[test]
fn create_and_free() {
    let mut pool: HandlePool<Handle> = HandlePool::new();
    assert!(pool.is_empty());

    let h1 = pool.create();
    let h2 = pool.create();
    assert!(h1.is_valid() && h2.is_valid());
    assert!(pool.contains(h1) && pool.contains(h2));
    assert_eq!(pool.len(), 2);

    assert!(pool.free(h1));
    assert!(!pool.contains(h1));
    assert!(pool.contains(h2));
    assert_eq!(pool.len(), 1);

    // Freeing twice is a no-op.
    assert!(!pool.free(h1));
    assert_eq!(pool.len(), 1);

    // The null handle is never alive.
    assert!(!pool.contains(Handle::default()));
}

#[test]
fn stale_handles() {
    let mut pool: HandlePool<Handle> = HandlePool::new();

    let old: Vec<_> = (0..10).map(|_| pool.create()).collect();
    for &h in &old {
        pool.free(h);
    }

    for _ in 0..10 {
        let h = pool.create();
        let stale = old[h.index() as usize];
        assert_ne!(stale.version(), h.version());
        assert!(!pool.contains(stale));
    }
}

#[test]
fn lowest_index_first() {
    let mut pool: HandlePool<Handle> = HandlePool::new();

    let mut live = vec![];
    for _ in 0..5 {
        for _ in 0..50 {
            live.push(pool.create());
        }

        for _ in 0..live.len() / 2 {
            let i = rand::random::<usize>() % live.len();
            pool.free(live.swap_remove(i));
        }
    }

    for h in live {
        pool.free(h);
    }

    for index in 0..50 {
        assert_eq!(pool.create().index(), index);
    }
}

#[test]
fn iter() {
    let mut pool: HandlePool<Handle> = HandlePool::new();

    let handles: Vec<_> = (0..10).map(|_| pool.create()).collect();
    for h in handles.iter().step_by(3) {
        pool.free(*h);
    }

    let expected: Vec<_> = handles
        .iter()
        .enumerate()
        .filter(|&(i, _)| i % 3 != 0)
        .map(|(_, h)| *h)
        .collect();

    assert_eq!(pool.iter().collect::<Vec<_>>(), expected);
    assert_eq!((&pool).into_iter().count(), 6);
}
