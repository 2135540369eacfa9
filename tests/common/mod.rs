//! Shared test fixtures

#![allow(dead_code)]

use openapi_mcp::spec::{parse_spec, SpecExplorer};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Small but complete document: path-level parameters, component
/// references, a self-referencing schema and a `default` response.
pub const SAMPLE_SPEC: &str = r"
openapi: 3.0.3
info:
  title: Sample API
  description: Fixture used by the test suite
  version: 1.2.3
  contact:
    name: API Team
    email: api@example.com
    url: https://example.com/support
  license:
    name: MIT
    url: https://opensource.org/licenses/MIT
servers:
  - url: https://api.example.com/v1
    description: Production
tags:
  - name: users
  - name: orders
paths:
  /users:
    get:
      summary: List users
      operationId: listUsers
      tags: [users]
      parameters:
        - name: limit
          in: query
          description: Page size
          schema:
            type: integer
            format: int32
        - $ref: '#/components/parameters/TraceHeader'
      responses:
        '200':
          description: A list of users
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/User'
    post:
      summary: Create user
      operationId: createUser
      tags: [users]
      requestBody:
        $ref: '#/components/requestBodies/NewUserBody'
      responses:
        '201':
          description: Created
        default:
          description: Unexpected error
  /users/{id}:
    parameters:
      - name: id
        in: path
        required: true
        description: Path-level id
        schema:
          type: string
      - name: verbose
        in: query
        schema:
          type: boolean
    get:
      summary: Get user
      description: Fetch a single user
      operationId: getUser
      tags: [users]
      parameters:
        - name: id
          in: path
          required: true
          description: User identifier
          schema:
            type: string
            format: uuid
      responses:
        default:
          description: Unexpected error
        '200':
          description: The user
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/User'
        '404':
          $ref: '#/components/responses/NotFound'
    delete:
      summary: Delete user
      responses:
        '204':
          description: Deleted
  /orders:
    get:
      summary: List orders
      responses:
        '200':
          description: Orders
components:
  parameters:
    TraceHeader:
      name: X-Trace-Id
      in: header
      description: Correlation id
      schema:
        $ref: '#/components/schemas/TraceId'
  requestBodies:
    NewUserBody:
      description: New user payload
      required: true
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/NewUser'
  responses:
    NotFound:
      description: Resource not found
  schemas:
    TraceId:
      type: string
      format: uuid
    User:
      type: object
      description: A registered user
      required: [id, name]
      properties:
        id:
          type: string
          format: uuid
        name:
          type: string
        role:
          type: string
          enum: [admin, member]
        address:
          type: object
          properties:
            city:
              type: string
            geo:
              type: object
              properties:
                lat:
                  type: number
                  format: double
                lng:
                  type: number
                  format: double
    NewUser:
      type: object
      required: [name]
      properties:
        name:
          type: string
    Node:
      type: object
      properties:
        value:
          type: string
        next:
          $ref: '#/components/schemas/Node'
        children:
          type: array
          items:
            $ref: '#/components/schemas/Node'
    Alias:
      $ref: '#/components/schemas/User'
";

/// Document without paths, tags or components
pub const EMPTY_SPEC: &str = r"
openapi: 3.0.0
info:
  title: Empty
  version: '0.1'
paths: {}
";

/// Root of a document split across files: references into `common.yaml`
/// and `responses/ok.yaml`, including a path item and a chained parameter.
pub const SPLIT_ROOT: &str = r"
openapi: 3.1.0
info:
  title: Split API
  version: '1'
paths:
  /files:
    parameters:
      - $ref: 'common.yaml#/components/parameters/Page'
    get:
      summary: List files
      parameters:
        - $ref: '#/components/parameters/Limit'
      responses:
        '200':
          $ref: 'responses/ok.yaml'
        default:
          $ref: 'common.yaml#/components/responses/Error'
  /shared:
    $ref: 'common.yaml#/paths/~1shared'
components:
  parameters:
    Limit:
      $ref: 'common.yaml#/components/parameters/Limit'
";

/// Shared components referenced by [`SPLIT_ROOT`]
pub const SPLIT_COMMON: &str = r"
paths:
  /shared:
    post:
      summary: Shared upload
      requestBody:
        $ref: '#/components/requestBodies/Upload'
      responses:
        '204':
          description: Stored
components:
  parameters:
    Page:
      name: page
      in: query
      schema:
        type: integer
    Limit:
      $ref: '#/components/parameters/PageSize'
    PageSize:
      name: limit
      in: query
      required: true
      description: Page size
      schema:
        type: [integer, 'null']
  requestBodies:
    Upload:
      description: Upload payload
      required: true
      content:
        application/octet-stream: {}
  responses:
    Error:
      description: Failure
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Problem'
";

/// Response document in a subdirectory of [`SPLIT_ROOT`]
pub const SPLIT_OK_RESPONSE: &str = r"
description: Files
content:
  application/json:
    schema:
      type: array
      items:
        $ref: '../common.yaml#/components/schemas/File'
";

/// Write the split document into `dir` and return the root path
pub fn write_split_spec(dir: &Path) -> PathBuf {
    std::fs::create_dir_all(dir.join("responses")).expect("create fixture dir");
    std::fs::write(dir.join("common.yaml"), SPLIT_COMMON).expect("write common.yaml");
    std::fs::write(dir.join("responses/ok.yaml"), SPLIT_OK_RESPONSE).expect("write ok.yaml");
    let root = dir.join("openapi.yaml");
    std::fs::write(&root, SPLIT_ROOT).expect("write openapi.yaml");
    root
}

/// Explorer over [`SAMPLE_SPEC`]
pub fn sample_explorer() -> Arc<SpecExplorer> {
    Arc::new(explorer(SAMPLE_SPEC))
}

/// Explorer over an arbitrary YAML document
pub fn explorer(yaml: &str) -> SpecExplorer {
    SpecExplorer::new(parse_spec(yaml.as_bytes()).expect("fixture parses"))
}

/// Minimal HTTP server that answers every request with the same body and
/// counts the requests it received.
pub struct StubServer {
    /// Base URL, e.g. `http://127.0.0.1:12345`
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    /// Start a server answering `status` with `body`
    pub async fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub address");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/yaml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    /// URL of a document on this server
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Number of requests received so far
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
