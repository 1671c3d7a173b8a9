//! Prints the residual divergence left by the pressure solve as the Jacobi
//! iteration count grows, for eyeballing convergence behavior.
//!
//! Run with: cargo run --release --example divergence_decay -p fluid

use fluid::field::{DoubleBuffer, Field};
use fluid::kernels::project;
use glam::Vec2;

fn l2(field: &Field<f32>) -> f32 {
    let sum: f32 = field.data().iter().map(|d| d * d).sum();
    (sum / field.data().len() as f32).sqrt()
}

fn main() {
    env_logger::init();

    const N: usize = 64;

    // Divergent radial burst in the middle of the grid.
    let mut velocity = Field::<Vec2>::new(N, N);
    let c = N as f32 / 2.0;
    let sigma = (N as f32 / 6.0) * (N as f32 / 6.0);
    for j in 0..N {
        for i in 0..N {
            let dx = i as f32 + 0.5 - c;
            let dy = j as f32 + 0.5 - c;
            let falloff = 0.05 * (-(dx * dx + dy * dy) / sigma).exp();
            velocity.set(i, j, Vec2::new(dx * falloff, dy * falloff));
        }
    }

    let mut div = Field::new(N, N);
    project::divergence(&velocity, &mut div);
    println!("initial divergence L2: {:.6}", l2(&div));

    for iterations in [1usize, 2, 5, 10, 20, 40, 80, 160] {
        let mut pressure = DoubleBuffer::<f32>::new(N, N);
        for _ in 0..iterations {
            let (read, write) = pressure.split();
            project::pressure(read, &div, write);
            pressure.swap();
        }

        let mut projected = Field::new(N, N);
        project::subtract_gradient(pressure.read(), &velocity, &mut projected);
        let mut residual = Field::new(N, N);
        project::divergence(&projected, &mut residual);

        println!("{:>4} iterations -> residual L2 {:.6}", iterations, l2(&residual));
    }
}
