//! End-to-end tests through the dispatch table: decode a record, prep it,
//! shoot it, and query the hits.

use approx::assert_relative_eq;

use faceted_kernel_geom::pg::{ID_P_DATA, ID_P_HEAD};
use faceted_kernel_geom::{
    ArsRecord, BotRecord, ExternalRecord, Internal, PgFaceRecord, PgRecord, SolidType,
};
use faceted_kernel_math::{Point3, Tolerance, Transform, Vec3};
use faceted_kernel_raytrace::intersect::collect_hits;
use faceted_kernel_raytrace::{
    free, functab, functab_by_label, norm, prep, shot, vshot, FacetInput, FacetList, HitSide,
    Primitive, Ray, RtConfig, RtError,
};

const CUBE_VERTS: [[f64; 3]; 8] = [
    [0.0, 0.0, -0.5],
    [1.0, 0.0, -0.5],
    [1.0, 1.0, -0.5],
    [0.0, 1.0, -0.5],
    [0.0, 0.0, 0.5],
    [1.0, 0.0, 0.5],
    [1.0, 1.0, 0.5],
    [0.0, 1.0, 0.5],
];

const CUBE_QUADS: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [0, 4, 7, 3],
    [1, 2, 6, 5],
];

fn import(rec: ExternalRecord) -> Internal {
    functab(rec.solid_type())
        .ops
        .import(&rec, &Transform::identity())
        .unwrap()
}

fn bot_cube() -> Internal {
    let mut faces = Vec::new();
    for [a, b, c, d] in CUBE_QUADS {
        faces.push([a as i64, b as i64, c as i64]);
        faces.push([a as i64, c as i64, d as i64]);
    }
    import(ExternalRecord::Bot(BotRecord {
        mode: 2,
        orientation: 2,
        error_mode: 0,
        vertices: CUBE_VERTS.to_vec(),
        faces,
        thickness: Vec::new(),
        face_mode: Vec::new(),
    }))
}

fn pg_cube() -> Internal {
    let faces = CUBE_QUADS
        .iter()
        .map(|q| {
            let verts: Vec<[f64; 3]> = q.iter().map(|&i| CUBE_VERTS[i]).collect();
            let a = Point3::from(verts[0]);
            let n = (Point3::from(verts[1]) - a).cross(&(Point3::from(verts[2]) - a));
            PgFaceRecord {
                id: ID_P_DATA,
                verts,
                normal: [n.x, n.y, n.z],
                vertex_normals: Vec::new(),
            }
        })
        .collect();
    import(ExternalRecord::Pg(PgRecord {
        id: ID_P_HEAD,
        faces,
    }))
}

fn ars_cube() -> Internal {
    // Curve points after the very first are offsets from it, so the first
    // point sits at the origin and the whole ARS is placed afterwards.
    let square = |z: f64| {
        vec![
            [-0.5, -0.5, z],
            [0.5, -0.5, z],
            [0.5, 0.5, z],
            [-0.5, 0.5, z],
        ]
    };
    let rec = ExternalRecord::Ars(ArsRecord {
        curves: vec![
            vec![[0.0, 0.0, 0.0]; 4],
            square(0.0),
            square(1.0),
            vec![[0.0, 0.0, 1.0]; 4],
        ],
    });
    functab(SolidType::Ars)
        .ops
        .import(&rec, &Transform::translation(0.5, 0.5, -0.5))
        .unwrap()
}

fn up_ray(x: f64, y: f64) -> Ray {
    Ray::new(Point3::new(x, y, -10.0), Vec3::z())
}

#[test]
fn unit_cube_bot_single_segment() {
    let st = prep("cube.bot", &bot_cube(), &RtConfig::default()).unwrap();
    let ray = up_ray(0.5, 0.5);
    let segs = shot(&st, &ray).unwrap();
    assert_eq!(segs.len(), 1);
    assert_relative_eq!(segs[0].entry.dist, 9.5, epsilon = 1e-9);
    assert_relative_eq!(segs[0].exit.dist, 10.5, epsilon = 1e-9);
    assert!(segs[0].entry.dist < segs[0].exit.dist);

    let n_in = norm(&st, &segs[0].entry, &ray).unwrap();
    let n_out = norm(&st, &segs[0].exit, &ray).unwrap();
    assert_relative_eq!(n_in.normal.dot(ray.direction.as_ref()), -1.0, epsilon = 1e-12);
    assert_relative_eq!(n_out.normal.dot(ray.direction.as_ref()), 1.0, epsilon = 1e-12);
}

#[test]
fn shared_edge_hits_collapse() {
    let st = prep("cube.bot", &bot_cube(), &RtConfig::default()).unwrap();
    let ray = up_ray(0.5, 0.5);
    // Both diagonals are crossed: two raw hits per cap.
    let raw = collect_hits(&st.name, &ray, st.facets(), 128);
    assert_eq!(raw.len(), 4);
    let segs = shot(&st, &ray).unwrap();
    assert_eq!(segs.len(), 1);
    assert_eq!(segs[0].entry.side, HitSide::Entry);
    assert!(!segs[0].entry.fictitious && !segs[0].exit.fictitious);
}

#[test]
fn every_faceted_kind_agrees_on_the_cube() {
    let cfg = RtConfig::default();
    let ray = up_ray(0.3, 0.6);
    for (name, ip) in [("bot", bot_cube()), ("pg", pg_cube()), ("ars", ars_cube())] {
        let st = prep(name, &ip, &cfg).unwrap();
        let segs = shot(&st, &ray).unwrap();
        assert_eq!(segs.len(), 1, "{name}");
        assert_relative_eq!(segs[0].entry.dist, 9.5, epsilon = 1e-9);
        assert_relative_eq!(segs[0].exit.dist, 10.5, epsilon = 1e-9);
        let n = norm(&st, &segs[0].entry, &ray).unwrap();
        assert_relative_eq!(n.normal.z, -1.0, epsilon = 1e-12);
        free(st).unwrap();
    }
}

#[test]
fn plate_centered_on_hit() {
    let t = 0.2;
    let ip = import(ExternalRecord::Bot(BotRecord {
        mode: 3,
        orientation: 2,
        error_mode: 0,
        vertices: vec![[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 3.0, 0.0]],
        faces: vec![[0, 1, 2]],
        thickness: vec![t],
        face_mode: vec![false],
    }));
    let st = prep("plate", &ip, &RtConfig::default()).unwrap();

    for angle in [0.0f64, 0.3, 1.0] {
        let dir = Vec3::new(angle.sin(), 0.0, angle.cos());
        let centroid = Point3::new(1.0, 1.0, 0.0);
        let ray = Ray::new(centroid - dir * 7.0, dir);
        let segs = shot(&st, &ray).unwrap();
        assert_eq!(segs.len(), 1);
        let seg = segs[0];
        assert_relative_eq!(seg.len(), t / angle.cos(), epsilon = 1e-9);
        assert_relative_eq!((seg.entry.dist + seg.exit.dist) * 0.5, 7.0, epsilon = 1e-9);
    }
}

#[test]
fn collinear_facet_is_rejected() {
    let mut list = FacetList::new();
    let added = list.add(
        "line",
        FacetInput::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]),
        Tolerance::DEFAULT.dist,
    );
    assert_eq!(added, 0);
    assert!(list.is_empty());
}

#[test]
fn vshot_matches_individual_shots() {
    let st = prep("cube.bot", &bot_cube(), &RtConfig::default()).unwrap();
    let rays: Vec<Ray> = (0..40)
        .map(|i| {
            let f = i as f64 / 40.0;
            Ray::new(Point3::new(-1.0 + 3.0 * f, 0.37, -10.0), Vec3::new(0.05, 0.0, 1.0))
        })
        .collect();
    let bundle = vshot(&st, &rays).unwrap();
    assert_eq!(bundle.len(), rays.len());
    for (ray, segs) in rays.iter().zip(&bundle) {
        assert_eq!(&shot(&st, ray).unwrap(), segs);
    }
    assert!(bundle.iter().any(|s| !s.is_empty()));
    assert!(bundle.iter().any(|s| s.is_empty()));
}

#[test]
fn unsupported_kinds_report_instead_of_crashing() {
    let ft = functab(SolidType::Sph);
    let err = ft.ops.prep("ball", &bot_cube(), &RtConfig::default()).unwrap_err();
    assert!(matches!(err, RtError::Unsupported { label: "sph", op: "prep" }));
    let err = ft.ops.bbox(&bot_cube()).unwrap_err();
    assert!(matches!(err, RtError::Unsupported { op: "bbox", .. }));
}

#[test]
fn label_lookup_finds_faceted_kinds() {
    for (label, kind) in [
        ("ars", SolidType::Ars),
        ("pg", SolidType::Poly),
        ("bot", SolidType::Bot),
    ] {
        let ft = functab_by_label(label).unwrap();
        assert_eq!(ft.solid_type, kind);
        assert_eq!(ft.ops.solid_type(), kind);
    }
}

#[test]
fn config_caps_hits() {
    let cfg = RtConfig::from_toml_str("[hits]\nbot = 2\n").unwrap();
    let st = prep("cube.bot", &bot_cube(), &cfg).unwrap();
    // Only the two bottom hits survive the cap; they collapse to one.
    assert!(shot(&st, &up_ray(0.5, 0.5)).unwrap().is_empty());
}

#[test]
fn placement_moves_the_solid() {
    let ft = functab(SolidType::Bot);
    let moved = ft
        .ops
        .xform(&bot_cube(), &Transform::translation(0.0, 0.0, 2.0))
        .unwrap();
    let st = prep("moved", &moved, &RtConfig::default()).unwrap();
    let segs = shot(&st, &up_ray(0.2, 0.7)).unwrap();
    assert_relative_eq!(segs[0].entry.dist, 11.5, epsilon = 1e-9);
    assert_relative_eq!(ft.ops.volume(&moved).unwrap(), 1.0, epsilon = 1e-12);
}
