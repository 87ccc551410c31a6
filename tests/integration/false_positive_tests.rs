//! False positive regression tests
//!
//! Every member in these scratch projects is used in a way a plain name
//! search would miss: through dispatch, attributes, accessors, generics or
//! framework conventions. None of them may be reported. Each test also
//! declares one genuinely dead member to prove the analysis ran.

use deadsharp::analysis::Analyzer;
use deadsharp::{CancellationToken, Config, SolutionLoader};
use tempfile::TempDir;

const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#;

/// Fully qualified names reported for a one-project solution, public
/// members included
fn unused(files: &[(&str, &str)]) -> Vec<String> {
    let mut config = Config::default();
    config.exclude_public_api = false;
    unused_with(&config, files)
}

fn unused_with(config: &Config, files: &[(&str, &str)]) -> Vec<String> {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("App/App.csproj");
    std::fs::create_dir_all(project.parent().unwrap()).unwrap();
    std::fs::write(&project, SDK_PROJECT).unwrap();
    for (name, contents) in files {
        std::fs::write(dir.path().join("App").join(name), contents).unwrap();
    }

    let solution = SolutionLoader::new(config).load(&project).unwrap();
    Analyzer::new(config, CancellationToken::new())
        .analyze(&solution)
        .unwrap()
        .unused_symbols()
        .iter()
        .map(|s| s.fully_qualified_name.clone())
        .collect()
}

#[test]
fn test_test_methods_are_not_reported() {
    let found = unused(&[(
        "CalculatorTests.cs",
        r#"
using Xunit;

namespace App.Tests
{
    public class CalculatorTests
    {
        [Fact]
        public void Adds() { }

        [Theory]
        [InlineData(1)]
        public void Subtracts(int value) { }

        [NUnit.Framework.Test]
        public void Multiplies() { }

        [Microsoft.VisualStudio.TestTools.UnitTesting.TestMethodAttribute]
        public void Divides() { }

        private void Dead() { }
    }
}
"#,
    )]);
    assert_eq!(found, vec!["App.Tests.CalculatorTests.Dead()"]);
}

#[test]
fn test_controller_actions_are_not_reported() {
    let found = unused(&[(
        "OrdersController.cs",
        r#"
namespace App.Web
{
    public class OrdersController : ControllerBase
    {
        public IActionResult List() => null;
        public IActionResult Show(int id) => null;
    }

    public class Api
    {
        [HttpPost("/orders")]
        public void Create() { }

        [Route("/ping")]
        public string Ping() => "pong";

        public void Dead() { }
    }
}
"#,
    )]);
    assert_eq!(found, vec!["App.Web.Api.Dead()"]);
}

#[test]
fn test_controller_base_through_intermediate_type() {
    let found = unused(&[(
        "Controllers.cs",
        r#"
namespace App.Web
{
    public abstract class ApiControllerBase : Controller { }

    public class UsersController : ApiControllerBase
    {
        public object Index() => null;
    }
}
"#,
    )]);
    assert!(found.is_empty(), "unexpected: {:?}", found);
}

#[test]
fn test_serialized_members_are_not_reported() {
    let found = unused(&[(
        "Dto.cs",
        r#"
using System.Runtime.Serialization;
using System.Text.Json.Serialization;

namespace App.Models
{
    public class UserDto
    {
        [JsonPropertyName("id")]
        public int Id { get; set; }

        [DataMember]
        private string name;

        [Newtonsoft.Json.JsonProperty("mail")]
        public string Mail { get; set; }

        public string Dead { get; set; }
    }
}
"#,
    )]);
    assert_eq!(found, vec!["App.Models.UserDto.Dead"]);
}

#[test]
fn test_keep_markers_are_not_reported() {
    let found = unused(&[(
        "Plugin.cs",
        r#"
class Plugin
{
    [UsedImplicitly]
    void LoadedByReflection() { }

    [Preserve]
    int linkerKept;

    void Dead() { }
}
"#,
    )]);
    assert_eq!(found, vec!["Plugin.Dead()"]);
}

#[test]
fn test_event_handlers_are_not_reported() {
    let found = unused(&[(
        "MainForm.cs",
        r#"
using System;

partial class MainForm
{
    void SaveButton_Click(object sender, EventArgs e) { }
    void Window_Loaded(object sender, RoutedEventArgs e) { }
    void OnClosing() { }
    void HandleResize(object sender, EventArgs e) { }
    void RefreshHandler() { }
    void Dead(object sender, EventArgs e) { }
}
"#,
    )]);
    assert_eq!(found, vec!["MainForm.Dead(object, EventArgs)"]);
}

#[test]
fn test_dispatch_members_are_not_reported() {
    let found = unused(&[(
        "Shapes.cs",
        r#"
interface IShape
{
    double Area();
}

abstract class Shape : IShape
{
    public abstract double Area();
    protected virtual string Describe() => "shape";
}

class Circle : Shape
{
    public override double Area() => 3.14;
    protected override string Describe() => "circle";
    double IShape.Area() => 0;
    void Dead() { }
}
"#,
    )]);
    assert_eq!(found, vec!["Circle.Dead()"]);
}

#[test]
fn test_property_used_through_accessors() {
    let found = unused(&[(
        "Counter.cs",
        r#"
class Counter
{
    private int Total { get; set; }
    private int Limit { get; }
    private int Dead { get; set; }

    static void Main()
    {
        var counter = new Counter();
        counter.Total = 1;
        System.Console.WriteLine(counter.Limit);
    }
}
"#,
    )]);
    assert_eq!(found, vec!["Counter.Dead"]);
}

#[test]
fn test_generic_method_used_through_constructed_call() {
    let found = unused(&[(
        "Cache.cs",
        r#"
class Cache
{
    private T Get<T>(string key) => default;
    private T Dead<T>(string key) => default;

    static void Main()
    {
        var cache = new Cache();
        cache.Get<int>("a");
        cache.Get<string>("b");
    }
}
"#,
    )]);
    assert_eq!(found, vec!["Cache.Dead(string)"]);
}

#[test]
fn test_method_group_counts_as_reference() {
    let found = unused(&[(
        "Worker.cs",
        r#"
using System;

class Worker
{
    private void Step() { }
    private void Dead() { }

    static void Main()
    {
        var worker = new Worker();
        Action action = worker.Step;
        action();
    }
}
"#,
    )]);
    assert_eq!(found, vec!["Worker.Dead()"]);
}

#[test]
fn test_public_members_excluded_by_default() {
    let found = unused_with(
        &Config::default(),
        &[(
            "Library.cs",
            r#"
public class Library
{
    public void Api() { }
    public int Count { get; set; }
    internal void Internal() { }
    private void Private() { }
}
"#,
        )],
    );
    assert_eq!(found, vec!["Library.Internal()", "Library.Private()"]);
}

#[test]
fn test_retain_patterns_from_config() {
    let mut config = Config::default();
    config.exclude_public_api = false;
    config.retain = vec!["*Migration".into()];
    let found = unused_with(
        &config,
        &[(
            "Seed.cs",
            "class Seed { void ApplyMigration() { } void Dead() { } }",
        )],
    );
    assert_eq!(found, vec!["Seed.Dead()"]);
}

#[test]
fn test_optional_and_params_overloads_are_not_reported() {
    let found = unused(&[(
        "Writer.cs",
        r#"
class Writer
{
    void Write(int n) { }
    void Write(string s, int pad = 0) { }
    void Log(string format, params object[] args) { }
    void Dead(int n) { }

    static void Main()
    {
        var w = new Writer();
        w.Write(1);
        w.Write("x");
        w.Log("a");
        w.Log("a", 1, 2, 3);
    }
}
"#,
    )]);
    assert_eq!(found, vec!["Writer.Dead(int)"]);
}

#[test]
fn test_dynamic_receiver_keeps_optional_overloads() {
    let found = unused(&[(
        "Stores.cs",
        r#"
class Repo { public void Save(string key) { } }
class Cache
{
    public void Save(string key, int ttl = 60) { }
    public void Dead() { }
}

class Program
{
    static void Main()
    {
        dynamic d = new Repo();
        d.Save("x");
    }
}
"#,
    )]);
    assert_eq!(found, vec!["Cache.Dead()"]);
}

#[test]
fn test_fields_read_outside_shadowing_scopes_are_not_reported() {
    let found = unused(&[(
        "Tally.cs",
        r#"
using System.Collections.Generic;

class Tally
{
    private int count;
    private int total;
    private int dead;

    int Run(List<int> xs, bool b)
    {
        xs.ForEach(count => System.Console.WriteLine(count));
        if (b) { var total = 2; total++; }
        return count + total;
    }

    static void Main() { new Tally().Run(null, true); }
}
"#,
    )]);
    assert_eq!(found, vec!["Tally.dead"]);
}
