use super::LeafUpdatePredicate;
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Point, Real, Vector};
use crate::parallel::WorkerPool;
use crate::partitioning::Bvh;
use crate::query::Ray;
use std::sync::Arc;

fn make_test_aabb(i: usize) -> Aabb {
    Aabb::from_half_extents(Vector::repeat(i as Real).into(), Vector::repeat(1.0))
}

fn random_aabb(rng: &mut oorandom::Rand32) -> Aabb {
    let center = Point::new(
        rng.rand_float() as Real * 100.0 - 50.0,
        rng.rand_float() as Real * 100.0 - 50.0,
        rng.rand_float() as Real * 100.0 - 50.0,
    );
    let half_extents = Vector::new(
        rng.rand_float() as Real * 3.0 + 0.1,
        rng.rand_float() as Real * 3.0 + 0.1,
        rng.rand_float() as Real * 3.0 + 0.1,
    );
    Aabb::from_half_extents(center, half_extents)
}

fn brute_force(aabbs: &[Aabb], query: &Aabb) -> Vec<u32> {
    (0..aabbs.len() as u32)
        .filter(|i| aabbs[*i as usize].intersects(query))
        .collect()
}

fn tree_query(bvh: &Bvh<u32>, query: &Aabb) -> Vec<u32> {
    let mut result = vec![];
    bvh.intersect_aabb(query, &mut result);
    result.sort_unstable();
    result
}

#[test]
fn bvh_insert_and_removal_recycle_every_slot() {
    let mut rng = oorandom::Rand32::new(42);
    let mut bvh = Bvh::new();
    let mut leaves = vec![];

    for i in 0..200u32 {
        leaves.push(bvh.insert(random_aabb(&mut rng), i));
        bvh.assert_well_formed();
    }

    assert_eq!(bvh.leaf_count(), 200);
    assert_eq!(bvh.capacity(), 399);
    assert_eq!(bvh.free_slot_count(), 0);

    // Remove in an interleaved order.
    let (even, odd): (Vec<_>, Vec<_>) = leaves.iter().enumerate().partition(|(i, _)| i % 2 == 0);
    for (i, leaf) in even.into_iter().chain(odd.into_iter().rev()) {
        assert_eq!(bvh.remove(*leaf), i as u32);
        bvh.assert_well_formed();
    }

    assert!(bvh.is_empty());
    assert_eq!(bvh.leaf_count(), 0);
    assert_eq!(bvh.free_slot_count(), bvh.capacity());

    // Freed slots are reused before the arena grows.
    let _ = bvh.insert(make_test_aabb(0), 0);
    let _ = bvh.insert(make_test_aabb(1), 1);
    assert_eq!(bvh.capacity(), 399);
    bvh.assert_well_formed();
}

#[test]
fn bvh_shuffled_removal_keeps_the_tree_valid() {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0);
    let mut bvh = Bvh::new();
    let mut leaves: Vec<_> = (0..128u32)
        .map(|i| (bvh.insert(make_test_aabb(i as usize), i), i))
        .collect();
    leaves.shuffle(&mut rng);

    let (removed, kept) = leaves.split_at(64);
    for (leaf, data) in removed {
        assert_eq!(bvh.remove(*leaf), *data);
        bvh.assert_well_formed();
    }

    assert_eq!(bvh.leaf_count(), 64);
    let everything = Aabb::new(Point::origin(), Point::new(1000.0, 1000.0, 1000.0));
    let mut found = tree_query(&bvh, &everything);
    let mut expected: Vec<_> = kept.iter().map(|(_, data)| *data).collect();
    found.sort_unstable();
    expected.sort_unstable();
    assert_eq!(found, expected);
}

#[test]
fn bvh_box_query_matches_brute_force() {
    let mut rng = oorandom::Rand32::new(1234);
    let mut bvh = Bvh::new();
    let mut aabbs: Vec<_> = (0..300).map(|_| random_aabb(&mut rng)).collect();
    let leaves: Vec<_> = aabbs
        .iter()
        .enumerate()
        .map(|(i, aabb)| bvh.insert(*aabb, i as u32))
        .collect();

    for _ in 0..50 {
        let query = random_aabb(&mut rng).loosened(5.0);
        assert_eq!(tree_query(&bvh, &query), brute_force(&aabbs, &query));
    }

    // Move half of the boxes around, some of them far away.
    for (i, leaf) in leaves.iter().enumerate().step_by(2) {
        let shift = Vector::new(rng.rand_float() as Real * 20.0 - 10.0, 0.0, 0.0);
        aabbs[i] = aabbs[i].translated(&shift);
        bvh.update(*leaf, aabbs[i]);
        assert_eq!(*bvh.leaf_data(*leaf), i as u32);
    }

    bvh.assert_well_formed();

    for _ in 0..50 {
        let query = random_aabb(&mut rng).loosened(5.0);
        assert_eq!(tree_query(&bvh, &query), brute_force(&aabbs, &query));
    }
}

#[test]
fn bvh_sibling_search_picks_the_closest_leaf() {
    let mut bvh = Bvh::new();
    let a = bvh.insert(make_test_aabb(0), 0);
    let _ = bvh.insert(
        Aabb::from_half_extents(Point::new(10.0, 0.0, 0.0), Vector::repeat(1.0)),
        1,
    );
    let c = bvh.insert(
        Aabb::from_half_extents(Point::new(0.5, 0.0, 0.0), Vector::repeat(1.0)),
        2,
    );

    let parent = bvh.node(c).parent;
    let siblings = bvh.node(parent).children().unwrap();
    assert!(siblings.contains(&a));
    assert!(siblings.contains(&c));
    bvh.assert_well_formed();
}

#[test]
fn bvh_update_inside_parent_keeps_the_topology() {
    let mut bvh = Bvh::new();
    let leaves: Vec<_> = (0..10).map(|i| bvh.insert(make_test_aabb(i * 3), i as u32)).collect();
    let before: Vec<_> = leaves.iter().map(|l| bvh.node(*l).parent).collect();

    let parent = bvh.node(leaves[4]).parent;
    let shrunk = *bvh.node_aabb(leaves[4]);
    let shrunk = Aabb::new(shrunk.mins + Vector::repeat(0.1), shrunk.maxs);
    assert!(bvh.node_aabb(parent).contains(&shrunk));

    bvh.update(leaves[4], shrunk);

    let after: Vec<_> = leaves.iter().map(|l| bvh.node(*l).parent).collect();
    assert_eq!(before, after);
    assert_eq!(*bvh.node_aabb(leaves[4]), shrunk);
    bvh.assert_well_formed();
}

#[test]
fn bvh_rotations_keep_the_tree_valid() {
    // Inserting sorted boxes is the worst case for incremental insertion.
    let mut bvh = Bvh::new();

    for i in 0..512 {
        let _ = bvh.insert(make_test_aabb(i), i as u32);
    }

    bvh.assert_well_formed();
    assert!(bvh.depth() < 512);
    assert_eq!(bvh.reachable_leaf_count(bvh.root().unwrap()), 512);
}

#[test]
fn bvh_sibling_search_beats_a_list_layout() {
    let mut rng = oorandom::Rand32::new(31);
    let aabbs: Vec<_> = (0..2000).map(|_| random_aabb(&mut rng)).collect();
    let mut bvh = Bvh::new();

    for (i, aabb) in aabbs.iter().enumerate() {
        let _ = bvh.insert(*aabb, i as u32);
    }
    bvh.assert_well_formed();

    // A degenerate tree where every interior node encloses a suffix of the boxes.
    let mut suffix = Aabb::new_invalid();
    let mut list_cost = 0.0;
    for (i, aabb) in aabbs.iter().enumerate().rev() {
        suffix.merge(aabb);
        if i + 1 < aabbs.len() {
            list_cost += suffix.surface_area();
        }
    }

    assert!(bvh.total_interior_area() < list_cost * 0.1);
    assert!(bvh.depth() < 64);
}

#[test]
fn bvh_cast_ray_returns_the_closest_leaf() {
    let mut bvh = Bvh::new();
    let mut ids = vec![];

    for x in [15.0, 5.0, 10.0] {
        ids.push(bvh.insert(
            Aabb::from_half_extents(Point::new(x, 0.0, 0.0), Vector::repeat(1.0)),
            x as u32,
        ));
    }
    // Off the ray.
    let _ = bvh.insert(
        Aabb::from_half_extents(Point::new(2.0, 5.0, 0.0), Vector::repeat(1.0)),
        100,
    );

    let ray = Ray::new(Point::origin(), Vector::x());
    let hit = bvh.cast_ray(&ray, Real::MAX, |id, _, max_toi| {
        bvh.node_aabb(id).cast_local_ray(&ray, max_toi)
    });

    let (leaf, toi) = hit.unwrap();
    assert_eq!(*bvh.leaf_data(leaf), 5);
    assert_relative_eq!(toi, 4.0);

    let miss = bvh.cast_ray(&ray, 3.0, |id, _, max_toi| {
        bvh.node_aabb(id).cast_local_ray(&ray, max_toi)
    });
    assert!(miss.is_none());

    let backward = Ray::new(Point::new(-1.0, 0.0, 0.0), -Vector::x());
    assert!(bvh
        .cast_ray(&backward, Real::MAX, |id, _, max_toi| bvh
            .node_aabb(id)
            .cast_local_ray(&backward, max_toi))
        .is_none());
}

#[test]
fn bvh_partition_covers_every_leaf() {
    let mut rng = oorandom::Rand32::new(7);
    let mut bvh = Bvh::new();

    for i in 0..100 {
        let _ = bvh.insert(random_aabb(&mut rng), i);
    }

    for cutoff in 0..6 {
        let (roots, shallow_leaves) = bvh.partition(cutoff);
        let covered: usize = roots
            .iter()
            .map(|root| bvh.reachable_leaf_count(*root))
            .sum();
        assert_eq!(covered + shallow_leaves.len(), 100);
    }

    let (roots, _) = bvh.partition(0);
    assert_eq!(roots, vec![bvh.root().unwrap()]);
}

#[test]
fn bvh_detach_and_reattach_subtree() {
    let mut rng = oorandom::Rand32::new(99);
    let mut bvh = Bvh::new();
    let aabbs: Vec<_> = (0..64).map(|_| random_aabb(&mut rng)).collect();

    for (i, aabb) in aabbs.iter().enumerate() {
        let _ = bvh.insert(*aabb, i as u32);
    }

    let (roots, _) = bvh.partition(2);
    let subtrees: Vec<_> = roots.iter().map(|r| bvh.detach_subtree(*r)).collect();
    let detached_leaves: usize = subtrees.iter().map(|s| s.tree().leaf_count()).sum();
    assert_eq!(detached_leaves + bvh.leaf_count(), 64);

    for subtree in &subtrees {
        subtree.tree().assert_well_formed();
    }

    for subtree in subtrees {
        let _ = bvh.reattach_subtree(subtree);
    }

    bvh.assert_well_formed();
    assert_eq!(bvh.leaf_count(), 64);

    let query = Aabb::new(Point::new(-20.0, -20.0, -20.0), Point::new(20.0, 20.0, 20.0));
    assert_eq!(tree_query(&bvh, &query), brute_force(&aabbs, &query));
}

#[test]
fn bvh_parallel_update_matches_sequential_update() {
    let mut rng = oorandom::Rand32::new(2024);
    let aabbs: Vec<_> = (0..500).map(|_| random_aabb(&mut rng)).collect();
    let targets: Vec<_> = aabbs
        .iter()
        .enumerate()
        .map(|(i, aabb)| {
            if i % 3 == 0 {
                let shift = Vector::new(
                    rng.rand_float() as Real * 30.0 - 15.0,
                    rng.rand_float() as Real * 30.0 - 15.0,
                    0.0,
                );
                aabb.translated(&shift)
            } else {
                *aabb
            }
        })
        .collect();
    let targets = Arc::new(targets);

    let mut sequential = Bvh::new();
    let mut parallel = Bvh::new();
    let mut leaves = vec![];

    for (i, aabb) in aabbs.iter().enumerate() {
        let _ = sequential.insert(*aabb, i as u32);
        leaves.push(parallel.insert(*aabb, i as u32));
    }

    let moved_targets = targets.clone();
    let moved: LeafUpdatePredicate<u32> = Arc::new(move |i: &u32, current: &Aabb| {
        let target = moved_targets[*i as usize];
        (target != *current).then_some(target)
    });

    let num_seq = sequential.update_leaves(|i, current| moved(i, current));
    let mut pool = WorkerPool::new(4).unwrap();
    let num_par = parallel
        .par_update_leaves(&mut pool, 3, moved.clone())
        .unwrap();

    assert_eq!(num_seq, num_par);
    assert_eq!(num_par, (0..500).filter(|i| i % 3 == 0).count());
    sequential.assert_well_formed();
    parallel.assert_well_formed();
    assert_eq!(pool.outstanding_rounds(), 0);

    // Leaf ids survive the parallel update.
    for (i, leaf) in leaves.iter().enumerate() {
        assert_eq!(*parallel.leaf_data(*leaf), i as u32);
        assert_eq!(*parallel.node_aabb(*leaf), targets[i]);
    }

    for _ in 0..50 {
        let query = random_aabb(&mut rng).loosened(8.0);
        let expected = brute_force(&targets, &query);
        assert_eq!(tree_query(&sequential, &query), expected);
        assert_eq!(tree_query(&parallel, &query), expected);
    }

    // Nothing moves anymore.
    assert_eq!(
        parallel
            .par_update_leaves(&mut pool, 3, moved)
            .unwrap(),
        0
    );
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "neither reachable nor free")]
fn bvh_mutations_check_the_tree_in_debug_builds() {
    use super::BvhNode;

    let mut bvh = Bvh::new();
    let _ = bvh.insert(make_test_aabb(0), 0);
    // Leak a slot: it is neither reachable from the root nor in the free-list.
    bvh.nodes.push(BvhNode::free());
    let _ = bvh.insert(make_test_aabb(1), 1);
}
