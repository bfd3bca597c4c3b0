use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use uniforge_engine::device::{HeadlessGpu, HeadlessInit};
use uniforge_engine::logging::{init_logging, LoggingConfig};
use uniforge_engine::uniform::{UniformBuffer, UniformBufferInit};
use uniforge_layout::{ElementType, Layout, MemorySink, UniformBlock};

mod report;
mod scene;

#[derive(Parser, Debug)]
#[command(name = "uniforge-studio")]
#[command(about = "Inspect the std140 layout of a sample lighting block")]
struct Options {
    /// Also upload the block to a headless GPU and read it back
    #[arg(long)]
    gpu: bool,

    /// Log filter directives (same syntax as RUST_LOG)
    #[arg(long, value_name = "DIRECTIVES")]
    filter: Option<String>,
}

fn main() -> Result<()> {
    let opts = Options::parse();
    init_logging(LoggingConfig {
        env_filter: opts.filter.clone(),
        ..Default::default()
    });

    println!();
    println!("  UNIFORGE STUDIO  ·  std140 uniform layout inspector");
    println!();

    let layout = Arc::new(
        Layout::compile(&scene::schema()).context("failed to compile sample lighting schema")?,
    );
    print!("{}", report::layout_table(&layout));
    println!();

    let values = scene::values(0.0);
    let mut block = UniformBlock::from_layout(Arc::clone(&layout));
    let mut mirror = MemorySink::with_len(layout.size_bytes() as usize);
    let out = block
        .write(&values, &mut mirror)
        .context("failed to serialize sample values")?;
    log::info!(
        "serialized {} fields into {} of {} bytes",
        out.fields_consumed,
        out.bytes_written,
        layout.size_bytes()
    );

    block
        .set_f32(scene::ids::EXPOSURE, 0.8, &mut mirror)
        .context("failed to update exposure")?;
    print!("{}", report::hex_dump(mirror.contents()));

    if opts.gpu {
        upload_to_gpu(layout, &values)?;
    }

    Ok(())
}

fn upload_to_gpu(layout: Arc<Layout>, values: &[uniforge_layout::UniformValue]) -> Result<()> {
    let gpu = HeadlessGpu::new_blocking(HeadlessInit::default())?;
    let mut ubo = UniformBuffer::from_layout(
        gpu.device(),
        layout,
        &UniformBufferInit {
            label: Some("studio lights ubo".into()),
            usage: UniformBufferInit::default().usage | wgpu::BufferUsages::COPY_SRC,
        },
    );

    ubo.write(gpu.queue(), values)
        .context("failed to upload sample values")?;
    ubo.set(gpu.queue(), scene::ids::EXPOSURE, ElementType::Float32, 0.8f32)
        .context("failed to update exposure on the GPU")?;

    let readback = gpu.read_buffer(ubo.buffer()).context("failed to read uniforms back")?;
    let image = ubo.block().bytes();
    anyhow::ensure!(
        readback.get(..image.len()) == Some(image),
        "GPU buffer differs from the CPU image"
    );

    log::info!(
        "uploaded {} bytes to {} ({} allocated)",
        ubo.layout().size_bytes(),
        gpu.adapter_info().name,
        ubo.buffer().size()
    );
    Ok(())
}
