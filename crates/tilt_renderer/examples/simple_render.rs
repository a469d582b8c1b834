//! Simple sphere tracer example.
//!
//! Builds a small scene by hand, renders it through the worker pool and
//! saves the presented frame as PNG.

use tilt_core::{Camera, Film, Light, Sphere};
use tilt_math::{Rgb, Vector3};
use tilt_renderer::{Coordinator, FrameBuffer, RenderConfig, Scene};

fn main() {
    println!("Tilt Sphere Tracer - Simple Example");
    println!("===================================");

    let scene = build_scene(800, 450);
    let config = RenderConfig::anti_aliased();

    println!(
        "Rendering {}x{} @ {} spp on a {}x{} tile grid...",
        scene.width,
        scene.height,
        config.samples_per_pixel,
        config.tile_grid_columns,
        config.tile_grid_rows
    );

    let start = std::time::Instant::now();
    let sink = FrameBuffer::new(scene.width, scene.height);
    let mut coordinator = Coordinator::spawn(scene, config, sink).expect("Failed to start workers");
    coordinator.render_until_presented().expect("Render failed");
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.png";
    coordinator
        .sink()
        .to_image()
        .save(filename)
        .expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene(width: u32, height: u32) -> Scene {
    let aspect = width as f64 / height as f64;
    // Film origin is its lower-left corner
    let film = Film::new(Vector3::new(-2.0 * aspect, -1.0, 2.0), 4.0 * aspect, 4.0);
    let camera = Camera::new(Vector3::new(0.0, 1.0, -2.0), film);

    let spheres = vec![
        // Ground
        Sphere::new(
            Vector3::new(0.0, -1000.0, 10.0),
            1000.0,
            Rgb::new(120.0, 120.0, 120.0),
        ),
        Sphere::new(Vector3::new(-3.0, 1.0, 10.0), 1.0, Rgb::new(200.0, 60.0, 40.0)),
        Sphere::new(Vector3::new(0.0, 1.5, 12.0), 1.5, Rgb::new(60.0, 180.0, 80.0)),
        Sphere::new(Vector3::new(3.0, 1.0, 9.0), 1.0, Rgb::new(50.0, 90.0, 220.0)),
    ];

    let lights = vec![
        Light::new(Vector3::new(-6.0, 8.0, 4.0), 2500.0),
        Light::new(Vector3::new(5.0, 6.0, 6.0), 1200.0),
    ];

    Scene::new(camera, spheres, lights, width, height)
}
