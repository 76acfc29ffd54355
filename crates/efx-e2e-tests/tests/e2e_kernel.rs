mod common;

use efx_ast::{BinaryOp, Expr, FuncDef, FuncParam, Statement, Type, Variable};

/// The canonical round trip: `result = a + b` over 4-component float
/// vectors, with `a` and `b` bound as params.
#[test]
fn round_trip_vector_add() {
    let mut p = common::effect("Add");
    p.declare(Variable::param("a", Type::FLOAT4, "getA"));
    p.declare(Variable::param("b", Type::FLOAT4, "getB"));
    let p = common::with_main(
        p,
        vec![Statement::Decl {
            var: Variable::new("result", Type::FLOAT4),
            init: Some(Expr::binary(
                Type::FLOAT4,
                BinaryOp::Add,
                Expr::var("a", Type::FLOAT4),
                Expr::var("b", Type::FLOAT4),
            )),
        }],
    );

    let output = common::compile(&p);
    let c = common::c_text(&output);
    let lines = common::trimmed_lines(c);
    let body: Vec<&&str> = lines.iter().filter(|l| l.contains("result_")).collect();
    assert_eq!(
        body,
        vec![
            &"float result_x = a_tmp_x + b_tmp_x;",
            &"float result_y = a_tmp_y + b_tmp_y;",
            &"float result_z = a_tmp_z + b_tmp_z;",
            &"float result_w = a_tmp_w + b_tmp_w;",
        ]
    );

    // 8 scalar float parameters, `a` lanes before `b` lanes.
    let params = common::native_params(c);
    assert_eq!(params.len(), 8);
    let names: Vec<&str> = params.iter().map(|p| common::param_name(p)).collect();
    assert_eq!(
        names,
        vec![
            "a_tmp_x", "a_tmp_y", "a_tmp_z", "a_tmp_w", "b_tmp_x", "b_tmp_y", "b_tmp_z", "b_tmp_w",
        ]
    );
    assert!(params.iter().all(|p| p.starts_with("jfloat ")));
}

#[test]
fn scalarization_emits_one_statement_per_lane() {
    for (ty, lanes) in [
        (Type::FLOAT2, 2usize),
        (Type::FLOAT3, 3),
        (Type::FLOAT4, 4),
    ] {
        let p = common::with_main(
            common::effect("Lanes"),
            vec![
                Statement::Decl {
                    var: Variable::new("v", ty),
                    init: Some(Expr::construct(
                        ty,
                        (0..lanes).map(|i| Expr::float(i as f32)).collect(),
                    )),
                },
                Statement::Expr(Expr::binary(
                    ty,
                    BinaryOp::MulAssign,
                    Expr::var("v", ty),
                    Expr::paren(Expr::var("v", ty)),
                )),
            ],
        );
        let output = common::compile(&p);
        let c = common::c_text(&output);
        let assigns: Vec<&str> = common::trimmed_lines(c)
            .into_iter()
            .filter(|l| l.contains("*= "))
            .collect();
        assert_eq!(assigns.len(), lanes, "arity {lanes}");
        for (lane, line) in assigns.iter().enumerate() {
            let sfx = efx_ast::lane_suffix(lane);
            assert_eq!(*line, format!("v{sfx} *= (v{sfx});"), "arity {lanes}");
        }
    }
}

/// `color.g` resolves to lane 1 regardless of the ambient vector lane.
#[test]
fn swizzle_green_is_lane_one() {
    let p = common::with_main(
        common::effect("Green"),
        vec![
            Statement::Decl {
                var: Variable::new("v", Type::FLOAT),
                init: Some(Expr::field(
                    Type::FLOAT,
                    Expr::var("color", Type::FLOAT4),
                    "g",
                )),
            },
            // A vector statement whose every lane reads the same field.
            Statement::Decl {
                var: Variable::new("u", Type::FLOAT4),
                init: Some(Expr::field(
                    Type::FLOAT,
                    Expr::var("color", Type::FLOAT4),
                    "g",
                )),
            },
        ],
    );
    let output = common::compile(&p);
    let c = common::c_text(&output);
    assert!(c.contains("float v = color_y;"));
    for lane in 0..4 {
        let sfx = efx_ast::lane_suffix(lane);
        assert!(c.contains(&format!("float u{sfx} = color_y;")));
    }
}

#[test]
fn user_function_inlines_ahead_of_use() {
    let mut p = common::effect("Bright");
    p.declare(Variable::param("gain", Type::FLOAT, "getGain"));

    let mut scale = FuncDef::new("scale", Some(Type::FLOAT4));
    scale.params.push(FuncParam {
        name: "c".into(),
        ty: Type::FLOAT4,
    });
    scale.body.push(Statement::Return(Some(Expr::binary(
        Type::FLOAT4,
        BinaryOp::Multiply,
        Expr::var("c", Type::FLOAT4),
        Expr::var("gain", Type::FLOAT),
    ))));
    p.functions.push(scale);

    let p = common::with_main(
        p,
        vec![Statement::Expr(Expr::binary(
            Type::FLOAT4,
            BinaryOp::Assign,
            Expr::var("color", Type::FLOAT4),
            Expr::call(
                Type::FLOAT4,
                "scale",
                vec![Expr::var("color", Type::FLOAT4)],
            ),
        ))],
    );

    let output = common::compile(&p);
    let c = common::c_text(&output);

    // Result temporaries declared once, assigned by the inlined body,
    // consumed by the original statement.
    for lane in 0..4 {
        let sfx = efx_ast::lane_suffix(lane);
        assert!(c.contains(&format!("float scale_res{sfx};")));
        assert!(c.contains(&format!("scale_res{sfx} = c{sfx} * gain_tmp;")));
        assert!(c.contains(&format!("color{sfx} = scale_res{sfx};")));
    }
    // Argument staging happens inside a scoped block.
    assert!(c.contains("float c_x = color_x;"));
}

#[test]
fn glue_blocks_land_in_host_wrapper_only() {
    let p = common::with_main(
        common::effect("Glued"),
        vec![
            Statement::Glue("    private int iterations = 3;".into()),
            Statement::Expr(Expr::binary(
                Type::FLOAT4,
                BinaryOp::Assign,
                Expr::var("color", Type::FLOAT4),
                Expr::var("color", Type::FLOAT4),
            )),
        ],
    );
    let output = common::compile(&p);
    assert!(common::java_text(&output).contains("private int iterations = 3;"));
    assert!(!common::c_text(&output).contains("iterations"));
}

#[test]
fn sample_intrinsic_reads_registered_buffer() {
    let mut p = common::effect("Copy");
    p.declare(Variable::sampler("base", Type::SAMPLER, 0));
    let p = common::with_main(
        p,
        vec![Statement::Expr(Expr::binary(
            Type::FLOAT4,
            BinaryOp::Assign,
            Expr::var("color", Type::FLOAT4),
            Expr::call(
                Type::FLOAT4,
                "sample",
                vec![
                    Expr::var("base", Type::SAMPLER),
                    Expr::field(Type::FLOAT, Expr::var("pos0", Type::FLOAT2), "x"),
                    Expr::field(Type::FLOAT, Expr::var("pos0", Type::FLOAT2), "y"),
                ],
            ),
        ))],
    );
    let output = common::compile(&p);
    let c = common::c_text(&output);
    assert!(c.contains("float sample_res_x;"));
    assert!(c.contains("int pix = src0[sy * src0scan + sx];"));
    assert!(c.contains("color_x = sample_res_x;"));
    assert!(c.contains("float pos0_x = src0x0 + inc0_x * 0.5f;"));
}

#[test]
fn do_while_and_while_render_c_loops() {
    let p = common::with_main(
        common::effect("Loops"),
        vec![
            Statement::Decl {
                var: Variable::new("i", Type::INT),
                init: Some(Expr::int(0)),
            },
            Statement::While {
                condition: Expr::binary(
                    Type::BOOL,
                    BinaryOp::Less,
                    Expr::var("i", Type::INT),
                    Expr::int(3),
                ),
                body: vec![Statement::Expr(Expr::binary(
                    Type::INT,
                    BinaryOp::AddAssign,
                    Expr::var("i", Type::INT),
                    Expr::int(1),
                ))],
            },
            Statement::DoWhile {
                body: vec![Statement::Expr(Expr::binary(
                    Type::INT,
                    BinaryOp::SubAssign,
                    Expr::var("i", Type::INT),
                    Expr::int(1),
                ))],
                condition: Expr::binary(
                    Type::BOOL,
                    BinaryOp::Greater,
                    Expr::var("i", Type::INT),
                    Expr::int(0),
                ),
            },
        ],
    );
    let output = common::compile(&p);
    let c = common::c_text(&output);
    assert!(c.contains("while (i < 3) {"));
    assert!(c.contains("do {"));
    assert!(c.contains("} while (i > 0);"));
}
