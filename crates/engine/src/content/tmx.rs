use std::path::Path;

use roxmltree::{Document, Node};

use crate::sim::{Exit, MapId, Rect, Vec2};

use super::error::{ContentError, ContentErrorCode, SourceLocation};

const WALLS_LAYER: &str = "Walls";
const EXITS_LAYER: &str = "Exits";
const ZONES_LAYER: &str = "Zones";
const HERO_START_LAYER: &str = "Hero-Start-Position";
const DESTINATION_PROPERTY: &str = "destination";

/// Object-layer content of one Tiled map. Tile layers are not read.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayout {
    pub bounds: Rect,
    pub walls: Vec<Rect>,
    pub exits: Vec<Exit>,
    pub zones: Vec<Rect>,
    pub hero_spawn: Option<Vec2>,
}

pub fn parse_tmx(file_path: &Path, raw: &str) -> Result<MapLayout, ContentError> {
    let doc = Document::parse(raw).map_err(|error| ContentError {
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
        ..ContentError::new(
            ContentErrorCode::XmlMalformed,
            format!("malformed XML: {error}"),
            file_path,
        )
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "map" {
        return Err(ContentError::at_node(
            ContentErrorCode::InvalidRoot,
            "root element must be <map>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let ctx = Ctx {
        file_path,
        doc: &doc,
    };
    let columns = ctx.required_number(root, "width")?;
    let rows = ctx.required_number(root, "height")?;
    let tile_width = ctx.required_number(root, "tilewidth")?;
    let tile_height = ctx.required_number(root, "tileheight")?;
    let mut layout = MapLayout {
        bounds: Rect::new(0.0, 0.0, columns * tile_width, rows * tile_height),
        walls: Vec::new(),
        exits: Vec::new(),
        zones: Vec::new(),
        hero_spawn: None,
    };

    for group in root
        .children()
        .filter(|node| node.is_element() && node.has_tag_name("objectgroup"))
    {
        let offset = Vec2::new(
            ctx.optional_number(group, "offsetx")?.unwrap_or(0.0),
            ctx.optional_number(group, "offsety")?.unwrap_or(0.0),
        );
        let mut objects = group
            .children()
            .filter(|node| node.is_element() && node.has_tag_name("object"));

        match group.attribute("name").unwrap_or_default() {
            WALLS_LAYER => {
                for object in objects {
                    layout.walls.push(ctx.object_rect(object, offset)?);
                }
            }
            ZONES_LAYER => {
                for object in objects {
                    layout.zones.push(ctx.object_rect(object, offset)?);
                }
            }
            EXITS_LAYER => {
                for object in objects {
                    layout.exits.push(ctx.exit(object, offset)?);
                }
            }
            HERO_START_LAYER => {
                if let Some(object) = objects.next() {
                    let rect = ctx.object_rect(object, offset)?;
                    layout.hero_spawn = Some(Vec2::new(rect.x, rect.y));
                }
            }
            _ => {}
        }
    }

    Ok(layout)
}

struct Ctx<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
}

impl Ctx<'_, '_> {
    fn error(&self, code: ContentErrorCode, message: String, node: Node<'_, '_>) -> ContentError {
        ContentError::at_node(code, message, self.file_path, self.doc, node)
    }

    fn optional_number(&self, node: Node<'_, '_>, name: &str) -> Result<Option<f32>, ContentError> {
        let Some(raw) = node.attribute(name) else {
            return Ok(None);
        };
        match raw.trim().parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(self.error(
                ContentErrorCode::InvalidValue,
                format!(
                    "attribute {name}=\"{raw}\" on <{}> must be a finite number",
                    node.tag_name().name()
                ),
                node,
            )),
        }
    }

    fn required_number(&self, node: Node<'_, '_>, name: &str) -> Result<f32, ContentError> {
        self.optional_number(node, name)?.ok_or_else(|| {
            self.error(
                ContentErrorCode::MissingField,
                format!(
                    "<{}> is missing required attribute {name}",
                    node.tag_name().name()
                ),
                node,
            )
        })
    }

    /// Point objects have no size and produce a zero-area rectangle.
    fn object_rect(&self, object: Node<'_, '_>, offset: Vec2) -> Result<Rect, ContentError> {
        let x = self.required_number(object, "x")?;
        let y = self.required_number(object, "y")?;
        let width = self.optional_number(object, "width")?.unwrap_or(0.0);
        let height = self.optional_number(object, "height")?.unwrap_or(0.0);
        if width < 0.0 || height < 0.0 {
            return Err(self.error(
                ContentErrorCode::InvalidValue,
                format!("object size {width}x{height} must not be negative"),
                object,
            ));
        }
        Ok(Rect::new(x + offset.x, y + offset.y, width, height))
    }

    fn exit(&self, object: Node<'_, '_>, offset: Vec2) -> Result<Exit, ContentError> {
        let rect = self.object_rect(object, offset)?;
        let name = object
            .attribute("name")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                self.error(
                    ContentErrorCode::MissingField,
                    "exit object must have a name".to_string(),
                    object,
                )
            })?;

        let destination = object
            .descendants()
            .filter(|node| node.is_element() && node.has_tag_name("property"))
            .find(|node| node.attribute("name") == Some(DESTINATION_PROPERTY))
            .and_then(|property| property.attribute("value").or_else(|| property.text()))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                self.error(
                    ContentErrorCode::MissingField,
                    format!("exit {name} has no \"{DESTINATION_PROPERTY}\" property"),
                    object,
                )
            })?;

        Ok(Exit {
            name: name.to_string(),
            destination: MapId::new(destination),
            rect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN_MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="40" height="30" tilewidth="16" tileheight="16">
 <layer id="1" name="Ground" width="40" height="30"><data encoding="csv">0</data></layer>
 <objectgroup id="2" name="Walls">
  <object id="1" x="0" y="0" width="640" height="16"/>
  <object id="2" x="0" y="16" width="16" height="464"/>
 </objectgroup>
 <objectgroup id="3" name="Exits" offsetx="4" offsety="0">
  <object id="3" name="to_plains" x="600" y="200" width="40" height="64">
   <properties>
    <property name="destination" value="plains_portal.tmx"/>
   </properties>
  </object>
 </objectgroup>
 <objectgroup id="4" name="Hero-Start-Position">
  <object id="4" x="100" y="120"><point/></object>
  <object id="5" x="300" y="300"><point/></object>
 </objectgroup>
 <objectgroup id="5" name="Decorations">
  <object id="6" x="1" y="1" width="1" height="1"/>
 </objectgroup>
</map>
"#;

    fn parse(raw: &str) -> Result<MapLayout, ContentError> {
        parse_tmx(Path::new("maps/main_map.tmx"), raw)
    }

    #[test]
    fn reads_object_layers_and_map_bounds() {
        let layout = parse(MAIN_MAP).expect("parse");

        assert_eq!(layout.bounds, Rect::new(0.0, 0.0, 640.0, 480.0));
        assert_eq!(layout.walls.len(), 2);
        assert_eq!(layout.walls[1], Rect::new(0.0, 16.0, 16.0, 464.0));
        assert!(layout.zones.is_empty());
        assert_eq!(
            layout.exits,
            vec![Exit {
                name: "to_plains".to_string(),
                destination: MapId::from("plains_portal.tmx"),
                rect: Rect::new(604.0, 200.0, 40.0, 64.0),
            }]
        );
        assert_eq!(layout.hero_spawn, Some(Vec2::new(100.0, 120.0)));
    }

    #[test]
    fn exit_without_destination_is_located_error() {
        let raw = r#"<map width="2" height="2" tilewidth="16" tileheight="16">
<objectgroup name="Exits">
  <object id="1" name="dead_end" x="0" y="0" width="8" height="8"/>
</objectgroup>
</map>"#;
        let error = parse(raw).expect_err("missing destination");
        assert_eq!(error.code, ContentErrorCode::MissingField);
        assert!(error.message.contains("dead_end"));
        assert_eq!(error.location.map(|loc| loc.line), Some(3));
    }

    #[test]
    fn malformed_xml_reports_position() {
        let error = parse("<map width=\"1\"><objectgroup></map>").expect_err("malformed");
        assert_eq!(error.code, ContentErrorCode::XmlMalformed);
        assert!(error.location.is_some());
    }

    #[test]
    fn wrong_root_and_bad_numbers_are_rejected() {
        let error = parse("<tileset/>").expect_err("root");
        assert_eq!(error.code, ContentErrorCode::InvalidRoot);

        let error = parse(r#"<map width="ten" height="2" tilewidth="16" tileheight="16"/>"#)
            .expect_err("bad width");
        assert_eq!(error.code, ContentErrorCode::InvalidValue);

        let error =
            parse(r#"<map width="2" height="2" tilewidth="16"/>"#).expect_err("missing tileheight");
        assert_eq!(error.code, ContentErrorCode::MissingField);
    }

    #[test]
    fn display_includes_file_and_position() {
        let error = parse("<tileset/>").expect_err("root");
        let rendered = error.to_string();
        assert!(rendered.starts_with("InvalidRoot:"));
        assert!(rendered.contains("maps/main_map.tmx"));
        assert!(rendered.contains("line=1"));
    }
}
