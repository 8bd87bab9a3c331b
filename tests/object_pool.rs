#[macro_use]
extern crate pastel;

use pastel::utils::prelude::*;

impl_handle!(SpriteHandle);

#[derive(Debug, PartialEq)]
struct Sprite {
    name: &'static str,
    frames: u32,
}

#[test]
fn typed_handles() {
    let mut pool = ObjectPool::<SpriteHandle, Sprite>::new();

    let hero = pool.create(Sprite {
        name: "hero",
        frames: 4,
    });

    assert!(hero.is_valid());
    assert!(pool.contains(hero));
    assert_eq!(pool.get(hero).map(|v| v.name), Some("hero"));
    assert_eq!(format!("{}", hero), "SpriteHandle(0:1)");

    pool.get_mut(hero).unwrap().frames = 8;
    assert_eq!(pool.free(hero).map(|v| v.frames), Some(8));
    assert!(pool.get(hero).is_none());
    assert!(pool.get_mut(hero).is_none());
    assert!(pool.free(hero).is_none());
    assert!(pool.is_empty());
}

#[test]
fn handles_snapshot() {
    let mut pool = ObjectPool::<SpriteHandle, u32>::new();
    for i in 0..10 {
        pool.create(i);
    }

    for h in pool.handles() {
        if *pool.get(h).unwrap() % 2 == 0 {
            pool.free(h);
        }
    }

    assert_eq!(pool.len(), 5);
    let values: Vec<_> = pool.iter().map(|h| *pool.get(h).unwrap()).collect();
    assert_eq!(values, vec![1, 3, 5, 7, 9]);
    assert_eq!(
        pool.iter().next(),
        Some(SpriteHandle::from(Handle::new(1, 1)))
    );
}
