//! A decoded land tile travelling through upload, pipeline and compositor.

use britannia_assets::{
    decode::land_record_bytes, ArtworkDecoder, AssetFactory, AssetKey, AssetKind, FormatProfile,
    MemorySource, Record,
};
use britannia_rendering::{
    ClearRequest, Compositor, DeviceCommand, HeadlessDevice, RenderPipeline, TextureCache,
};

#[test]
fn test_land_tile_frame() {
    let source = MemorySource::new().with(Record::new(5, land_record_bytes(0x7C00)));
    let artwork = AssetFactory::new(Box::new(source), ArtworkDecoder, FormatProfile::default());
    let bitmap = artwork.resolve(5).unwrap();

    let mut device = HeadlessDevice::new(1280, 720);
    let mut textures = TextureCache::new();
    let tile = textures
        .get_or_upload(AssetKey::new(AssetKind::Artwork, 5), &bitmap, &mut device)
        .unwrap();
    assert_eq!((tile.width, tile.height), (44, 44));

    let mut compositor = Compositor::new();
    let pipeline = RenderPipeline::new();
    pipeline.install(&mut compositor).unwrap();
    pipeline.set_tile(Some(tile));
    device.take_commands();

    for _ in 0..3 {
        compositor.execute_frame(&mut device).unwrap();
    }

    assert_eq!(device.frames_presented(), 3);
    assert_eq!(pipeline.quads_drawn(), 3);
    assert_eq!(textures.uploads(), 1);

    // Per frame: full clear, depth/stencil clear, the tile, present.
    let frame = &device.commands()[..4];
    assert_eq!(frame[0], DeviceCommand::Clear(ClearRequest::all([0.0, 0.0, 0.0, 1.0])));
    assert_eq!(frame[1], DeviceCommand::Clear(ClearRequest::depth_stencil()));
    assert!(matches!(frame[2], DeviceCommand::DrawSprites { .. }));
    assert_eq!(frame[3], DeviceCommand::Present);

    pipeline.set_tile(None);
    compositor.execute_frame(&mut device).unwrap();
    assert_eq!(pipeline.quads_drawn(), 3);
}
