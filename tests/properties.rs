use proptest::prelude::*;

use qtsim::{
    build_broad_phase, resolve, Aabb, Body, BroadPhase, BroadPhaseKind, Engine, NVec2, PairOutcome, Parameters,
    QueryMode, Quadtree, Stepper, Subdivision, System, UniformGrid,
};

const W: f64 = 1280.0;
const H: f64 = 720.0;

fn params() -> Parameters {
    Parameters {
        rest_separation: 0.0,
        ..Parameters::default()
    }
}

/// Two bodies whose centres are `gap * (ra + rb)` apart along `angle`
fn pair(
    (ax, ay, angle, gap): (f64, f64, f64, f64),
    (ra, rb, ma, mb): (u32, u32, u32, u32),
    (va, vb): ((f64, f64), (f64, f64)),
) -> (Body, Body) {
    let d = gap * f64::from(ra + rb);
    let a = Body::new(NVec2::new(ax, ay), NVec2::new(va.0, va.1), ra, ma).unwrap();
    let b = Body::new(
        NVec2::new(ax + d * angle.cos(), ay + d * angle.sin()),
        NVec2::new(vb.0, vb.1),
        rb,
        mb,
    )
    .unwrap();
    (a, b)
}

fn velocity() -> impl Strategy<Value = (f64, f64)> {
    (-300.0..300.0f64, -300.0..300.0f64)
}

fn shape() -> impl Strategy<Value = (u32, u32, u32, u32)> {
    (1u32..30, 1u32..30, 1u32..20, 1u32..20)
}

/// Bodies that fit inside the arena, as unit fractions scaled by the radius
fn arena_bodies(max: usize) -> impl Strategy<Value = Vec<Body>> {
    prop::collection::vec((0.0..=1.0f64, 0.0..=1.0f64, 1u32..30, velocity()), 1..max).prop_map(|raw| {
        raw.into_iter()
            .map(|(fx, fy, radius, (vx, vy))| {
                let r = f64::from(radius);
                let x = NVec2::new(r + fx * (W - 2.0 * r), r + fy * (H - 2.0 * r));
                Body::new(x, NVec2::new(vx, vy), radius, 1).unwrap()
            })
            .collect()
    })
}

/// Independent walk down the square geometry: where a box should be filed
fn expected_home(root: &Quadtree, aabb: &Aabb) -> (NVec2, f64, u32) {
    let node = root.node(root.root());
    let (mut c, mut h, mut depth) = (node.center, node.half_width, 1);

    'descend: while depth < root.max_depth() {
        let q = h * 0.5;
        for (ox, oy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            let cc = c + NVec2::new(ox, oy) * q;
            if Aabb::around(cc, q).contains(aabb) {
                c = cc;
                h = q;
                depth += 1;
                continue 'descend;
            }
        }
        break;
    }
    (c, h, depth)
}

proptest! {
    #[test]
    fn apart_bodies_are_never_touched(
        place in (100.0..1000.0f64, 100.0..600.0f64, 0.0..std::f64::consts::TAU, 1.001..5.0f64),
        shape in shape(),
        vels in (velocity(), velocity()),
    ) {
        let (mut a, mut b) = pair(place, shape, vels);
        let before = (a.clone(), b.clone());

        prop_assert_eq!(resolve(&mut a, &mut b, &Parameters::default()), PairOutcome::Apart);
        prop_assert_eq!(a.x, before.0.x);
        prop_assert_eq!(b.x, before.1.x);
        prop_assert_eq!(a.v, before.0.v);
        prop_assert_eq!(b.v, before.1.v);
    }

    #[test]
    fn contact_conserves_momentum(
        place in (100.0..1000.0f64, 100.0..600.0f64, 0.0..std::f64::consts::TAU, 0.01..1.0f64),
        shape in shape(),
        vels in (velocity(), velocity()),
        elasticity in 0.0..=1.0f64,
    ) {
        let (mut a, mut b) = pair(place, shape, vels);
        let p = Parameters { elasticity, ..params() };

        let before = a.momentum() + b.momentum();
        resolve(&mut a, &mut b, &p);
        let after = a.momentum() + b.momentum();

        let scale = 1.0 + before.norm();
        prop_assert!((after - before).norm() <= 1e-9 * scale, "{:?} -> {:?}", before, after);
    }

    #[test]
    fn elastic_contact_conserves_energy(
        place in (100.0..1000.0f64, 100.0..600.0f64, 0.0..std::f64::consts::TAU, 0.01..1.0f64),
        shape in shape(),
        vels in (velocity(), velocity()),
    ) {
        let (mut a, mut b) = pair(place, shape, vels);

        let before = a.kinetic_energy() + b.kinetic_energy();
        resolve(&mut a, &mut b, &params());
        let after = a.kinetic_energy() + b.kinetic_energy();

        prop_assert!((after - before).abs() <= 1e-9 * (1.0 + before), "{} -> {}", before, after);
    }

    #[test]
    fn quadtree_files_each_body_once_at_its_shallowest_fit(
        bodies in arena_bodies(60),
        max_depth in 1u32..7,
        lazy in any::<bool>(),
    ) {
        let subdivision = if lazy { Subdivision::Lazy } else { Subdivision::Eager };
        let mut tree = Quadtree::covering(W, H, max_depth, subdivision, QueryMode::RootDown).unwrap();
        tree.rebuild(&bodies);

        for (i, b) in bodies.iter().enumerate() {
            let stored = tree.nodes().iter().filter(|n| n.objects.contains(&i)).count();
            prop_assert_eq!(stored, 1);

            let home = tree.node(tree.owner_of(i).unwrap());
            prop_assert_eq!((home.center, home.half_width, home.depth), expected_home(&tree, &b.aabb()));
        }
    }

    #[test]
    fn grid_occupancy_matches_the_covered_cell_range(
        raw in prop::collection::vec((-50.0..1330.0f64, -50.0..770.0f64, 1u32..30), 1..20),
        cell_size in 20.0..120.0f64,
    ) {
        let bodies: Vec<Body> = raw
            .into_iter()
            .map(|(x, y, r)| Body::new(NVec2::new(x, y), NVec2::zeros(), r, 1).unwrap())
            .collect();
        let mut grid = UniformGrid::new(W, H, cell_size).unwrap();
        grid.rebuild(&bodies);

        for (i, b) in bodies.iter().enumerate() {
            let r = b.r();
            let cols = ((b.x.x - r) / cell_size).floor() as i64..=((b.x.x + r) / cell_size).floor() as i64;
            let rows = ((b.x.y - r) / cell_size).floor() as i64..=((b.x.y + r) / cell_size).floor() as i64;

            for row in 0..grid.rows() {
                for col in 0..grid.cols() {
                    let expected = cols.contains(&(col as i64)) && rows.contains(&(row as i64));
                    let present = grid.cell(col, row).unwrap().objects.contains(&i);
                    prop_assert_eq!(present, expected, "body {} cell ({}, {})", i, col, row);
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn bodies_never_leave_the_arena(
        bodies in arena_bodies(40),
        kind in prop_oneof![
            Just(BroadPhaseKind::BruteForce),
            Just(BroadPhaseKind::Grid),
            Just(BroadPhaseKind::Quadtree),
        ],
    ) {
        let p = Parameters::default();
        let engine = Engine { broad_phase: kind, ..Engine::default() };
        let index = build_broad_phase(&engine, &p).unwrap();
        let mut stepper = Stepper::new(System::new(bodies), p, index);

        for _ in 0..300 {
            stepper.step();
        }

        let p = stepper.params();
        for b in stepper.bodies() {
            let r = b.r();
            prop_assert!(b.x.x.is_finite() && b.x.y.is_finite());
            prop_assert!(b.x.x - r >= 0.0 && b.x.x + r <= p.width, "{:?}", b.x);
            prop_assert!(b.x.y - r >= 0.0 && b.x.y + r <= p.height, "{:?}", b.x);
        }
    }
}
