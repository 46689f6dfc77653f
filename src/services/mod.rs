pub mod landsat_service;
pub mod landsat_service_impl;
pub use landsat_service::{
    FetchRequest, LandsatError, LandsatService, PixelDto, ProcessedPixels, SceneSearchRequest,
    SearchDetailDto, SearchDto,
};
pub use landsat_service_impl::SeaOrmLandsatService;
