pub mod auth {

    pub const DEFAULT_USERNAME: &str = "explorer";

    pub const DEFAULT_EMAIL: &str = "explorer@localhost";

    /// Seeded with the default user; should be regenerated after first start.
    pub const DEFAULT_API_KEY: &str = "landsat_default_api_key_please_regenerate";
}

pub mod landsat {

    /// USGS collection 2 level 2 dataset for Landsat 8/9 OLI/TIRS.
    pub const DATASET: &str = "landsat_ot_c2_l2";

    pub const M2M_URL: &str = "https://m2m.cr.usgs.gov/api/api/json/stable";

    pub const MAX_CLOUD_COVER: f64 = 50.0;

    pub const SEARCH_WINDOW_DAYS: u32 = 30;

    /// Half-width in degrees of the scene-search box around a point.
    pub const SEARCH_BOX_HALF_EXTENT: f64 = 0.01;

    pub const MAX_SCENE_ID_LEN: usize = 120;
}

pub mod limits {

    pub const DEFAULT_HISTORY_LIMIT: u64 = 10;

    pub const MAX_HISTORY_LIMIT: u64 = 1000;
}
