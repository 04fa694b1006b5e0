use crate::error::CoreResult;
use crate::html::{attr, esc};

pub const LEAFLET_CSS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
pub const LEAFLET_CSS_SRI: &str = "sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY=";
pub const LEAFLET_JS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
pub const LEAFLET_JS_SRI: &str = "sha256-20nQCchB9co0qIjJZRGuk2/Z9VM+kNiyxNV1lvTlZBo=";

/// Overlay keys read from the map config, in layer-control order.
pub const MAP_OVERLAYS: [(&str, &str); 5] = [
    ("forest_2000", "Forest 2000"),
    ("forest_end_year", "Forest end-year"),
    ("forest_loss_since_2020", "Forest loss since 2020"),
    ("aoi_boundary", "AOI boundary"),
    ("maaamet_parcels", "Maa-amet parcels"),
];

pub const MAP_STYLE: &str = "#map { height: 480px; border: 1px solid #ddd; border-radius: 8px; }";

pub fn leaflet_head_tags() -> Vec<String> {
    vec![
        format!(
            "<link rel=\"stylesheet\"{}{}{} />",
            attr("href", LEAFLET_CSS_URL),
            attr("integrity", LEAFLET_CSS_SRI),
            attr("crossorigin", "")
        ),
        format!(
            "<script{}{}{}></script>",
            attr("src", LEAFLET_JS_URL),
            attr("integrity", LEAFLET_JS_SRI),
            attr("crossorigin", "")
        ),
    ]
}

/// `<div id="map">` plus the fixed bootstrap that loads `config_href`.
pub fn map_section(config_href: &str) -> CoreResult<Vec<String>> {
    // JSON string literal, with `</` broken so it cannot close the script element.
    let config_literal = serde_json::to_string(config_href)?.replace("</", "<\\/");
    let overlays_literal = serde_json::to_string(
        &MAP_OVERLAYS
            .iter()
            .map(|(key, label)| [*key, *label])
            .collect::<Vec<_>>(),
    )?;

    let mut out = vec![
        "  <h2 id=\"sec-map\">Map (interactive)</h2>".to_string(),
        format!(
            "  <p>Map configuration: <a{}>{}</a></p>",
            attr("href", config_href),
            esc(config_href)
        ),
        "  <div id=\"map\"></div>".to_string(),
        "  <script>".to_string(),
    ];
    out.push("    (function () {".to_string());
    out.push(format!("      var configUrl = {};", config_literal));
    out.push(format!("      var overlayKeys = {};", overlays_literal));
    out.extend(
        BOOTSTRAP_BODY
            .lines()
            .map(|l| format!("      {}", l).trim_end().to_string()),
    );
    out.push("    })();".to_string());
    out.push("  </script>".to_string());
    Ok(out)
}

const BOOTSTRAP_BODY: &str = r#"var base = new URL(configUrl, window.location.href);
var resolve = function (u) { return new URL(u, base).href; };
var map = L.map('map');
L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
map.setView([0, 0], 2);
fetch(configUrl).then(function (r) { return r.json(); }).then(function (cfg) {
  if (cfg.center && cfg.zoom) { map.setView(cfg.center, cfg.zoom); }
  var layers = cfg.layers || {};
  var overlays = {};
  var fitTo = null;
  overlayKeys.forEach(function (entry) {
    var def = layers[entry[0]];
    if (!def || !def.url) { return; }
    var layer;
    if (def.type === 'geojson') {
      layer = L.geoJSON(null, { style: def.style || {} });
      fetch(resolve(def.url)).then(function (r) { return r.json(); }).then(function (gj) {
        layer.addData(gj);
        if (entry[0] === 'aoi_boundary') { map.fitBounds(layer.getBounds()); }
      });
      if (entry[0] === 'aoi_boundary') { fitTo = layer; }
    } else if (def.type === 'image' && def.bounds) {
      layer = L.imageOverlay(resolve(def.url), def.bounds, { opacity: def.opacity || 0.7 });
    } else {
      layer = L.tileLayer(resolve(def.url), { opacity: def.opacity || 0.7 });
    }
    layer.addTo(map);
    overlays[entry[1]] = layer;
  });
  L.control.layers(null, overlays, { collapsed: false }).addTo(map);
  if (!fitTo && cfg.bounds) { map.fitBounds(cfg.bounds); }
}).catch(function (err) {
  document.getElementById('map').textContent = 'Map configuration could not be loaded: ' + err;
});"#;
