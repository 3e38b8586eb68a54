mod common;

use cicstat::{
    EdgePolicy, ParticleSet, RuntimeSpec, VpfBuilder, compute_vpf, compute_vpf_at_centers, vpf,
};
use common::{assert_valid_rows, isclose, uniform_particles};
use ndarray::ArrayView2;

#[test]
fn rows_are_valid_distributions() {
    let data = uniform_particles(2525365464, 2000, 100.0);
    let (nbins, num_pn, rmax) = (10, 6, 10.0);
    let rows = vpf(
        rmax, nbins, 200, num_pn, 42, &data.x, &data.y, &data.z, true, 100.0,
    )
    .unwrap();
    assert_valid_rows(&rows, nbins, num_pn, rmax);

    // larger spheres are less likely to be empty
    for pair in rows.windows(2) {
        assert!(pair[0].pn[0] >= pair[1].pn[0]);
    }
}

#[test]
fn repeated_calls_agree() {
    let data = uniform_particles(87512, 500, 50.0);
    let call = || vpf(4.0, 5, 300, 4, 7, &data.x, &data.y, &data.z, true, 50.0).unwrap();
    assert_eq!(call(), call());

    // a different seed should (almost certainly) give a different answer
    let other = vpf(4.0, 5, 300, 4, 8, &data.x, &data.y, &data.z, true, 50.0).unwrap();
    assert_ne!(call(), other);
}

#[test]
fn spheres_centered_on_lone_particle() {
    // every sphere is centered on the only particle, so every shell holds
    // exactly one particle
    let pos = [5.0];
    let particles = ParticleSet::new(&pos, &pos, &pos).unwrap();
    let config = VpfBuilder::new()
        .rmax(1.0)
        .nbins(4)
        .nspheres(0)
        .num_pn(2)
        .boxsize(10.0)
        .build()
        .unwrap();
    let centers = vec![[5.0; 3]; 100];
    for runtime in [RuntimeSpec::serial(), RuntimeSpec::with_threads(3)] {
        let output = compute_vpf_at_centers(&config, particles, &centers, &runtime).unwrap();
        assert_eq!(output.rows.len(), 4);
        for row in &output.rows {
            assert_eq!(row.pn, vec![0.0, 1.0], "rmax: {}", row.rmax);
        }
    }
}

#[test]
fn periodic_spheres_wider_than_half_the_box() {
    let data = uniform_particles(5, 50, 1.0);
    let rows = vpf(0.6, 2, 1, 3, 42, &data.x, &data.y, &data.z, true, 1.0).unwrap();
    assert_valid_rows(&rows, 2, 3, 0.6);

    // a particle that is exactly half of the box away along x is only
    // counted once (for the nearest image)
    let (x, y, z) = ([0.1], [0.5], [0.5]);
    let particles = ParticleSet::new(&x, &y, &z).unwrap();
    let config = VpfBuilder::new()
        .rmax(0.6)
        .nbins(2)
        .nspheres(0)
        .num_pn(3)
        .boxsize(1.0)
        .build()
        .unwrap();
    let centers = [[0.6, 0.5, 0.5]];
    let output =
        compute_vpf_at_centers(&config, particles, &centers, &RuntimeSpec::serial()).unwrap();
    assert_eq!(output.rows[0].pn, vec![1.0, 0.0, 0.0]);
    assert_eq!(output.rows[1].pn, vec![0.0, 1.0, 0.0]);
}

#[test]
fn zero_spheres() {
    let data = uniform_particles(1, 10, 10.0);
    let rows = vpf(1.0, 3, 0, 4, 7, &data.x, &data.y, &data.z, true, 10.0).unwrap();
    assert_eq!(rows.len(), 3);
    for row in rows {
        assert_eq!(row.pn, vec![0.0; 4]);
    }
}

#[test]
fn single_pn_entry() {
    let data = uniform_particles(1, 10, 10.0);
    let rows = vpf(1.0, 3, 50, 1, 7, &data.x, &data.y, &data.z, true, 10.0).unwrap();
    for row in rows {
        assert_eq!(row.pn, vec![1.0]);
    }
}

#[test]
fn empty_domain_region() {
    // every particle is crammed into a corner of a large periodic box. With
    // small spheres, practically every sphere is empty
    let x = [0.1, 0.2, 0.3, 0.15];
    let y = [0.1, 0.3, 0.2, 0.25];
    let z = [0.2, 0.1, 0.3, 0.05];
    let rows = vpf(0.5, 2, 100, 3, 99, &x, &y, &z, true, 100.0).unwrap();
    assert_valid_rows(&rows, 2, 3, 0.5);
    for row in &rows {
        assert!(row.pn[0] > 0.9, "{:?}", row.pn);
    }
}

#[test]
fn dense_particles_fill_every_sphere() {
    // a regular lattice with spacing 1 inside a periodic box of length 10.
    // A sphere of radius 3 always contains more than 50 lattice points
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();
    for i in 0..10 {
        for j in 0..10 {
            for k in 0..10 {
                x.push(i as f64 + 0.5);
                y.push(j as f64 + 0.5);
                z.push(k as f64 + 0.5);
            }
        }
    }
    let rows = vpf(3.0, 1, 5, 50, 5, &x, &y, &z, true, 10.0).unwrap();
    assert_valid_rows(&rows, 1, 50, 3.0);
    let pn = &rows[0].pn;
    assert!(pn[..49].iter().all(|p| *p == 0.0));
    assert_eq!(pn[49], 1.0);
}

#[test]
fn periodic_wrap() {
    // a pair of particles on opposite faces of the box. A sphere centered
    // on the face (at x = 0) should see both of them
    let x = [0.5, 9.5];
    let y = [5.0, 5.0];
    let z = [5.0, 5.0];
    let config = VpfBuilder::new()
        .rmax(1.0)
        .nbins(2)
        .nspheres(0)
        .num_pn(3)
        .boxsize(10.0)
        .build()
        .unwrap();
    let particles = ParticleSet::new(&x, &y, &z).unwrap();
    let centers = [[0.0, 5.0, 5.0]];
    let output =
        compute_vpf_at_centers(&config, particles, &centers, &RuntimeSpec::serial()).unwrap();
    // the inner shell has radius 0.5: both particles lie on its edge
    assert_eq!(output.rows[0].pn, vec![0.0, 0.0, 1.0]);
    assert_eq!(output.rows[1].pn, vec![0.0, 0.0, 1.0]);

    // without periodicity, only 1 particle is enclosed
    let mut builder = VpfBuilder::new();
    builder
        .rmax(1.0)
        .nbins(2)
        .nspheres(0)
        .num_pn(3)
        .boxsize(10.0)
        .periodic(false);
    let config = builder.build().unwrap();
    let output =
        compute_vpf_at_centers(&config, particles, &centers, &RuntimeSpec::serial()).unwrap();
    assert_eq!(output.rows[0].pn, vec![0.0, 1.0, 0.0]);
}

#[test]
fn derived_domain() {
    // when boxsize is 0, the domain is derived from the particles
    let data = uniform_particles(33, 1000, 20.0);
    for periodic in [true, false] {
        let rows = vpf(2.0, 4, 100, 5, 11, &data.x, &data.y, &data.z, periodic, 0.0).unwrap();
        assert_valid_rows(&rows, 4, 5, 2.0);
    }
}

#[test]
fn edge_policies() {
    let data = uniform_particles(71, 1000, 20.0);
    let particles = ParticleSet::new(&data.x, &data.y, &data.z).unwrap();
    for policy in [EdgePolicy::Interior, EdgePolicy::Anywhere] {
        let config = VpfBuilder::new()
            .rmax(3.0)
            .nbins(3)
            .nspheres(50)
            .num_pn(4)
            .seed(3)
            .periodic(false)
            .edge_policy(policy)
            .build()
            .unwrap();
        let output = compute_vpf(&config, particles, &RuntimeSpec::default()).unwrap();
        assert_valid_rows(&output.rows, 3, 4, 3.0);
    }
}

#[test]
fn f32_particles() {
    let data = uniform_particles(5, 1500, 30.0);
    let data32 = data.to_f32();
    let rows = vpf(3.0, 3, 200, 5, 17, &data32.x, &data32.y, &data32.z, true, 30.0).unwrap();
    assert_valid_rows(&rows, 3, 5, 3.0);

    // the 2 precisions draw different centers, but the estimates of the VPF
    // should be statistically consistent
    let rows64 = vpf(3.0, 3, 200, 5, 17, &data.x, &data.y, &data.z, true, 30.0).unwrap();
    assert!(isclose(rows[2].pn[0], rows64[2].pn[0], 0.0, 0.2));
}

#[test]
fn array_view_particles() {
    // positions are interpreted as a (3, n) array
    let positions = [1.0, 4.0, 6.5, 9.0, 2.0, 5.0, 3.5, 8.0, 7.0, 1.0, 5.5, 2.0];
    let particles = ParticleSet::from_array_view(ArrayView2::from_shape((3, 4), &positions).unwrap())
        .unwrap();
    let config = VpfBuilder::new()
        .rmax(2.0)
        .nbins(2)
        .nspheres(20)
        .num_pn(3)
        .seed(42)
        .boxsize(10.0)
        .build()
        .unwrap();
    let from_view = compute_vpf(&config, particles, &RuntimeSpec::serial()).unwrap();

    let (x, rest) = positions.split_at(4);
    let (y, z) = rest.split_at(4);
    let from_slices = compute_vpf(
        &config,
        ParticleSet::new(x, y, z).unwrap(),
        &RuntimeSpec::serial(),
    )
    .unwrap();
    assert_eq!(from_view.rows, from_slices.rows);
}
